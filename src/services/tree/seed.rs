//! Seed Loader
//!
//! The hand-authored starting shape of the tree: the root and the first level
//! along the analytical (1A) and temporal (1B) axes. Loading is idempotent;
//! rows that already exist are left untouched.

use tracing::info;

use fractal_history_core::{Anchor, Breadth, GenerationStatus, TreePosition, ROOT_ID};

use crate::models::anchor::SeedReport;
use crate::services::tree::ids::mint_position_id;
use crate::storage::database::{insert_anchor_if_absent, insert_position_if_absent};
use crate::storage::Database;
use crate::utils::error::AppResult;

struct SeedAnchor {
    id: &'static str,
    title: &'static str,
    scope: &'static str,
}

const ROOT: SeedAnchor = SeedAnchor {
    id: ROOT_ID,
    title: "The Story of Everything",
    scope: "The complete history of the universe, Earth, life, and humanity from the Big Bang to the present day.",
};

const LEVEL_1A: &[SeedAnchor] = &[
    SeedAnchor {
        id: "E8F2G",
        title: "Emergence of Life on Earth",
        scope: "The origin and early evolution of life on Earth, from first self-replicating molecules to complex multicellular organisms. ~4 billion years ago to ~600 million years ago.",
    },
    SeedAnchor {
        id: "Q7R2S",
        title: "Evolution of Humans",
        scope: "The evolutionary history of the human lineage from primate ancestors to modern Homo sapiens, including cognitive and physical adaptations. ~7 million years ago to ~300,000 years ago.",
    },
    SeedAnchor {
        id: "G7H2K",
        title: "Agricultural Revolution",
        scope: "The transition from hunter-gatherer societies to agricultural civilizations through plant and animal domestication. ~10,000 BCE to ~3,000 BCE.",
    },
    SeedAnchor {
        id: "C9D3E",
        title: "Industrial Revolution",
        scope: "The transformation from agrarian economies to industrial manufacturing through mechanization, fossil fuels, and factory production. ~1750 to ~1900 CE.",
    },
];

const LEVEL_1B: &[SeedAnchor] = &[
    SeedAnchor {
        id: "T4U9V",
        title: "Deep Time: 13.8 BYA - 3 MYA",
        scope: "The universe from the Big Bang through the formation of Earth and the evolution of life until the emergence of the human lineage.",
    },
    SeedAnchor {
        id: "W1X6Y",
        title: "Foraging Era: 3 MYA - 10,000 BCE",
        scope: "Human evolution and the long period of hunter-gatherer societies, including migration across the globe and adaptation to diverse environments.",
    },
    SeedAnchor {
        id: "Z5A3B",
        title: "Agricultural Civilizations: 10,000 BCE - 1500 CE",
        scope: "The rise of agriculture, cities, states, empires, and world religions. Covers ancient and medieval civilizations globally.",
    },
    SeedAnchor {
        id: "C8D2E",
        title: "Early Modern: 1500 - 1900 CE",
        scope: "Global integration through exploration, colonialism, scientific revolution, industrial revolution, and democratic revolutions.",
    },
    SeedAnchor {
        id: "F7G4H",
        title: "Contemporary: 1900 - Present",
        scope: "The modern era including world wars, decolonization, Cold War, digital revolution, globalization, and climate crisis.",
    },
];

impl SeedAnchor {
    fn anchor(&self, status: GenerationStatus) -> Anchor {
        Anchor {
            id: self.id.to_string(),
            title: self.title.to_string(),
            scope: self.scope.to_string(),
            generation_status: status,
        }
    }
}

/// Load the root and first-level anchors. Safe to run repeatedly.
pub fn seed_tree(db: &Database) -> AppResult<SeedReport> {
    let report = db.with_transaction(|tx| {
        let mut report = SeedReport::default();

        if insert_anchor_if_absent(tx, &ROOT.anchor(GenerationStatus::Complete))? {
            report.anchors_inserted += 1;
        }
        let root_position = TreePosition {
            position_id: ROOT_ID.to_string(),
            anchor_id: ROOT_ID.to_string(),
            parent_position_id: None,
            level: 0,
            breadth: Breadth::Root,
            position: 1,
        };
        if insert_position_if_absent(tx, &root_position)? {
            report.positions_inserted += 1;
        }

        for (breadth, anchors) in [(Breadth::A, LEVEL_1A), (Breadth::B, LEVEL_1B)] {
            for (index, seed) in anchors.iter().enumerate() {
                if insert_anchor_if_absent(tx, &seed.anchor(GenerationStatus::Placeholder))? {
                    report.anchors_inserted += 1;
                }
                let position = TreePosition {
                    position_id: mint_position_id(1, breadth, seed.id),
                    anchor_id: seed.id.to_string(),
                    parent_position_id: Some(ROOT_ID.to_string()),
                    level: 1,
                    breadth,
                    position: index as u32 + 1,
                };
                if insert_position_if_absent(tx, &position)? {
                    report.positions_inserted += 1;
                }
            }
        }

        Ok(report)
    })?;

    info!(
        anchors = report.anchors_inserted,
        positions = report.positions_inserted,
        "seed: tree seeded"
    );
    Ok(report)
}
