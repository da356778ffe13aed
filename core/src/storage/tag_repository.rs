use crate::models::{datetime_to_timestamp, timestamp_to_datetime, Page, Tag};
use crate::storage::PageRepository;
use crate::{Error, Result};
use rusqlite::{params, Connection, Row};

pub struct TagRepository;

impl TagRepository {
    fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: timestamp_to_datetime(row.get(2)?),
        })
    }

    /// Create a new tag
    pub fn create(conn: &Connection, name: &str) -> Result<Tag> {
        let now = chrono::Utc::now();
        conn.execute(
            "INSERT INTO tags (name, created_at) VALUES (?1, ?2)",
            params![name, datetime_to_timestamp(&now)],
        )?;

        Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
        })
    }

    /// Get a tag by name
    pub fn get_by_name(conn: &Connection, name: &str) -> Result<Tag> {
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM tags WHERE name = ?1")?;

        let tag = stmt.query_row(params![name], Self::tag_from_row)?;

        Ok(tag)
    }

    /// Get or create a tag by name. The second value is true if the tag was
    /// just created.
    pub fn get_or_create(conn: &Connection, name: &str) -> Result<(Tag, bool)> {
        match Self::get_by_name(conn, name) {
            Ok(tag) => Ok((tag, false)),
            Err(Error::Database(rusqlite::Error::QueryReturnedNoRows)) => {
                Ok((Self::create(conn, name)?, true))
            }
            Err(e) => Err(e),
        }
    }

    /// List all tags in creation order, with pagination
    pub fn list_all(conn: &Connection, offset: usize, limit: Option<usize>) -> Result<Vec<Tag>> {
        let mut stmt = conn
            .prepare("SELECT id, name, created_at FROM tags ORDER BY id LIMIT ?1 OFFSET ?2")?;

        let tags = stmt
            .query_map(
                params![limit.map(|l| l as i64).unwrap_or(-1), offset as i64],
                Self::tag_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    /// Count all tags
    pub fn n_all(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// List the tags carried by a page, in tag creation order
    pub fn list_for_page(
        conn: &Connection,
        page_id: i64,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Tag>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.created_at
             FROM tags t
             INNER JOIN page_tags pt ON pt.tag_id = t.id
             WHERE pt.page_id = ?1
             ORDER BY t.id LIMIT ?2 OFFSET ?3",
        )?;

        let tags = stmt
            .query_map(
                params![page_id, limit.map(|l| l as i64).unwrap_or(-1), offset as i64],
                Self::tag_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    /// Count the tags carried by a page
    pub fn n_for_page(conn: &Connection, page_id: i64) -> Result<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM page_tags WHERE page_id = ?1",
            params![page_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// List the pages carrying a tag, ordered by path, with pagination.
    /// Rows are bare (no child-count join).
    pub fn list_tagged(
        conn: &Connection,
        tag_id: i64,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Page>> {
        let mut stmt = conn.prepare(
            "SELECT p.id, p.path, p.created_at
             FROM pages p
             INNER JOIN page_tags pt ON pt.page_id = p.id
             WHERE pt.tag_id = ?1
             ORDER BY p.path LIMIT ?2 OFFSET ?3",
        )?;

        let pages = stmt
            .query_map(
                params![tag_id, limit.map(|l| l as i64).unwrap_or(-1), offset as i64],
                PageRepository::page_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    /// Count the pages carrying a tag
    pub fn n_tagged(conn: &Connection, tag_id: i64) -> Result<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM page_tags WHERE tag_id = ?1",
            params![tag_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// List the pages with no tags at all, ordered by path, with pagination.
    /// Rows are bare (no child-count join).
    pub fn list_untagged(
        conn: &Connection,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Page>> {
        let mut stmt = conn.prepare(
            "SELECT p.id, p.path, p.created_at
             FROM pages p
             LEFT JOIN page_tags pt ON pt.page_id = p.id
             WHERE pt.tag_id IS NULL
             ORDER BY p.path LIMIT ?1 OFFSET ?2",
        )?;

        let pages = stmt
            .query_map(
                params![limit.map(|l| l as i64).unwrap_or(-1), offset as i64],
                PageRepository::page_from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    /// Count the pages with no tags at all
    pub fn n_untagged(conn: &Connection) -> Result<usize> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pages p
             LEFT JOIN page_tags pt ON pt.page_id = p.id
             WHERE pt.tag_id IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Associate a tag with a page. Returns false if the association
    /// already existed.
    pub fn add_to_page(conn: &Connection, page_id: i64, tag_id: i64) -> Result<bool> {
        let now = chrono::Utc::now();
        let rows_affected = conn.execute(
            "INSERT OR IGNORE INTO page_tags (page_id, tag_id, created_at) VALUES (?1, ?2, ?3)",
            params![page_id, tag_id, datetime_to_timestamp(&now)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Remove a tag from a page
    pub fn remove_from_page(conn: &Connection, page_id: i64, tag_id: i64) -> Result<()> {
        let rows_affected = conn.execute(
            "DELETE FROM page_tags WHERE page_id = ?1 AND tag_id = ?2",
            params![page_id, tag_id],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound(format!(
                "Page {} does not carry tag {}",
                page_id, tag_id
            )));
        }

        Ok(())
    }

    /// Delete a tag row
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let rows_affected = conn.execute("DELETE FROM tags WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("Tag not found: {}", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PagePath;
    use crate::storage::Database;
    use tempfile::tempdir;

    fn setup_test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(&db_path);
        let conn = db.create().unwrap();
        (dir, conn)
    }

    #[test]
    fn test_get_or_create() {
        let (_dir, conn) = setup_test_db();

        let (tag1, created1) = TagRepository::get_or_create(&conn, "project").unwrap();
        let (tag2, created2) = TagRepository::get_or_create(&conn, "project").unwrap();

        assert!(created1);
        assert!(!created2);
        assert_eq!(tag1.id, tag2.id);
    }

    #[test]
    fn test_tags_listed_in_creation_order() {
        let (_dir, conn) = setup_test_db();

        TagRepository::create(&conn, "work").unwrap();
        TagRepository::create(&conn, "home").unwrap();

        let tags = TagRepository::list_all(&conn, 0, None).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["work", "home"]);
        assert_eq!(TagRepository::n_all(&conn).unwrap(), 2);
    }

    #[test]
    fn test_tagged_and_untagged_listings() {
        let (_dir, conn) = setup_test_db();

        let a = PageRepository::create(&conn, None, &PagePath::new("alpha")).unwrap();
        let b = PageRepository::create(&conn, None, &PagePath::new("beta")).unwrap();
        let tag = TagRepository::create(&conn, "work").unwrap();

        assert!(TagRepository::add_to_page(&conn, a, tag.id).unwrap());
        assert!(!TagRepository::add_to_page(&conn, a, tag.id).unwrap());

        let tagged = TagRepository::list_tagged(&conn, tag.id, 0, None).unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].id, a);
        assert!(!tagged[0].has_data);

        let untagged = TagRepository::list_untagged(&conn, 0, None).unwrap();
        assert_eq!(untagged.len(), 1);
        assert_eq!(untagged[0].id, b);

        assert_eq!(TagRepository::n_tagged(&conn, tag.id).unwrap(), 1);
        assert_eq!(TagRepository::n_untagged(&conn).unwrap(), 1);
        assert_eq!(TagRepository::n_for_page(&conn, a).unwrap(), 1);
        assert_eq!(TagRepository::n_for_page(&conn, b).unwrap(), 0);
    }

    #[test]
    fn test_remove_from_page() {
        let (_dir, conn) = setup_test_db();

        let a = PageRepository::create(&conn, None, &PagePath::new("alpha")).unwrap();
        let tag = TagRepository::create(&conn, "work").unwrap();
        TagRepository::add_to_page(&conn, a, tag.id).unwrap();

        TagRepository::remove_from_page(&conn, a, tag.id).unwrap();
        assert_eq!(TagRepository::n_tagged(&conn, tag.id).unwrap(), 0);

        let result = TagRepository::remove_from_page(&conn, a, tag.id);
        assert!(result.is_err());
    }
}
