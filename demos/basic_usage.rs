// Example: Basic usage of the tagtree-core library
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use tagtree_core::index::Index;
use tagtree_core::models::PagePath;
use tagtree_core::storage::Database;
use tagtree_core::tree::{Coordinate, TagTreeModel};

fn main() -> anyhow::Result<()> {
    let db_path = "basic_usage_tagtree.db";
    fs::remove_file(db_path).ok(); // Clean up previous run

    println!("--- Basic Usage of tagtree-core ---");

    // Initialize database
    let db = Database::new(db_path);
    let conn = db.create()?;
    println!(
        "   ✓ Database created with schema version {}",
        db.get_schema_version(&conn)?
    );

    // ========== Wire the index to a tree projection ==========
    println!("\n2. Connecting the tag tree projection...");
    let mut index = Index::new(conn);
    let model = Rc::new(RefCell::new(TagTreeModel::new()));
    index.connect(model.clone());
    println!("   ✓ Projection registered as index observer");

    // ========== Create pages ==========
    println!("\n3. Creating pages...");
    for path in ["projects:alpha", "projects:beta", "journal:today"] {
        let page = index.touch_page(&PagePath::new(path))?;
        println!("   ✓ Created page: {}", page.path);
    }

    // ========== Tag pages ==========
    println!("\n4. Tagging pages...");
    index.add_tag(&PagePath::new("projects:alpha"), "work")?;
    index.add_tag(&PagePath::new("projects:beta"), "work")?;
    index.add_tag(&PagePath::new("journal:today"), "home")?;
    println!(
        "   ✓ {} tags, {} untagged pages",
        index.n_list_tags(None)?,
        index.n_list_untagged()?
    );

    // The projection turned those mutations into row edits
    let edits = model.borrow_mut().take_edits();
    println!("   ✓ Projection produced {} row edits", edits.len());

    // ========== Resolve coordinates ==========
    println!("\n5. Resolving tree coordinates...");
    {
        let mut m = model.borrow_mut();
        for coord in [
            Coordinate::from(vec![0]),
            Coordinate::from(vec![1]),
            Coordinate::from(vec![1, 0]),
        ] {
            if let Some(node) = m.resolve(&index, &coord)? {
                let attrs = m.display_attributes(&node);
                println!("   ✓ {} -> {}", coord, attrs.label);
            }
        }
    }

    // ========== Reverse lookup ==========
    println!("\n6. Looking up where a page appears...");
    let coords = model
        .borrow_mut()
        .reverse_lookup(&index, &PagePath::new("projects:beta"))?
        .unwrap_or_default();
    for coord in &coords {
        println!("   ✓ projects:beta appears at {}", coord);
    }

    // An event loop would call this once per idle turn
    model.borrow_mut().idle_flush();

    println!("\n--- Done ---");
    fs::remove_file(db_path).ok();
    Ok(())
}
