//! Tree Store Integration Tests
//!
//! Seed loading, listing, ancestor paths and child writes against a
//! file-backed database.

use fractal_history::models::anchor::SeedReport;
use fractal_history::models::settings::BatchPolicy;
use fractal_history::services::tree::{seed_tree, ContextAssembler, TreeWriter};
use fractal_history::storage::Database;
use fractal_history_core::{
    Anchor, Breadth, CandidateAnchor, GenerationAxis, GenerationStatus, TreePosition, ROOT_ID,
};

fn file_database(dir: &tempfile::TempDir) -> Database {
    let db = Database::open(&dir.path().join("tree.db")).unwrap();
    seed_tree(&db).unwrap();
    db
}

fn candidates(titles: &[&str]) -> Vec<CandidateAnchor> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            CandidateAnchor::analytical(*title, format!("Scope of {}", title), i as u32 + 1, 8.0, 7.0, 7.6)
        })
        .collect()
}

#[test]
fn test_seed_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = file_database(&dir);
        assert_eq!(db.count_anchors().unwrap(), 10);
    }

    let reopened = Database::open(&dir.path().join("tree.db")).unwrap();
    assert_eq!(seed_tree(&reopened).unwrap(), SeedReport::default());

    let root = reopened.get_root().unwrap().unwrap();
    assert_eq!(root.id, ROOT_ID);
    assert_eq!(root.level, 0);
    assert!(root.parent_position_id.is_none());
}

#[test]
fn test_listing_is_stable_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir);

    let first = db.list_child_nodes(ROOT_ID, Breadth::B).unwrap();
    let second = db.list_child_nodes(ROOT_ID, Breadth::B).unwrap();
    assert_eq!(first, second);

    let positions: Vec<u32> = first.iter().map(|n| n.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    assert_eq!(first[0].title, "Deep Time: 13.8 BYA - 3 MYA");
}

#[test]
fn test_ancestor_path_through_generated_levels() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir);
    let writer = TreeWriter::new(&db, BatchPolicy::BestEffort);

    let level_two = writer
        .write_children(
            "G7H2K",
            GenerationAxis::Analytical,
            "1A-G7H2K",
            &candidates(&["Plant Domestication"]),
            GenerationStatus::Pending,
        )
        .unwrap();
    let child = &level_two.inserted[0].node;

    let level_three = writer
        .write_children(
            &child.id,
            GenerationAxis::Temporal,
            &child.position_id,
            &candidates(&["Wild Harvesting"]),
            GenerationStatus::Pending,
        )
        .unwrap();
    let grandchild = &level_three.inserted[0].node;
    assert_eq!(grandchild.level, 3);
    assert!(grandchild.position_id.starts_with("3B-"));

    let path = ContextAssembler::new(&db)
        .ancestor_path(&grandchild.position_id)
        .unwrap();
    let titles: Vec<&str> = path.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["The Story of Everything", "Agricultural Revolution", "Plant Domestication"]
    );
    let levels: Vec<u32> = path.iter().map(|a| a.level).collect();
    assert_eq!(levels, vec![0, 1, 2]);
}

#[test]
fn test_occupied_slot_is_reported_per_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir);

    // Occupy slot 1 of G7H2K along A the way a concurrent writer would
    db.insert_anchor(&Anchor {
        id: "AAAAA".to_string(),
        title: "Concurrent Child".to_string(),
        scope: "Written by another process.".to_string(),
        generation_status: GenerationStatus::Pending,
    })
    .unwrap();
    db.insert_position(&TreePosition {
        position_id: "2A-AAAAA".to_string(),
        anchor_id: "AAAAA".to_string(),
        parent_position_id: Some("1A-G7H2K".to_string()),
        level: 2,
        breadth: Breadth::A,
        position: 1,
    })
    .unwrap();

    let duplicate = db.insert_position(&TreePosition {
        position_id: "2A-AAAAB".to_string(),
        anchor_id: "AAAAA".to_string(),
        parent_position_id: Some("1A-G7H2K".to_string()),
        level: 2,
        breadth: Breadth::A,
        position: 1,
    });
    assert!(duplicate.unwrap_err().is_constraint_violation());

    let report = TreeWriter::new(&db, BatchPolicy::BestEffort)
        .write_children(
            "G7H2K",
            GenerationAxis::Analytical,
            "1A-G7H2K",
            &candidates(&["Plant Domestication", "Animal Domestication"]),
            GenerationStatus::Pending,
        )
        .unwrap();

    // Appending after the existing child keeps both candidates clear of slot 1
    assert!(report.failures.is_empty());
    let positions: Vec<u32> = report.inserted.iter().map(|c| c.node.position).collect();
    assert_eq!(positions, vec![2, 3]);
    assert_eq!(db.list_child_nodes("1A-G7H2K", Breadth::A).unwrap().len(), 3);
}
