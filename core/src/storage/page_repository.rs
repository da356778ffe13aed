use crate::models::{datetime_to_timestamp, timestamp_to_datetime, Page, PagePath};
use crate::{Error, Result};
use rusqlite::{params, Connection, Row};

pub struct PageRepository;

impl PageRepository {
    pub(crate) fn page_from_row(row: &Row) -> rusqlite::Result<Page> {
        Ok(Page {
            id: row.get(0)?,
            path: PagePath::new(&row.get::<_, String>(1)?),
            has_children: false,
            has_data: false,
            created_at: timestamp_to_datetime(row.get(2)?),
        })
    }

    fn hydrated_page_from_row(row: &Row) -> rusqlite::Result<Page> {
        let mut page = Self::page_from_row(row)?;
        page.has_children = row.get(3)?;
        page.has_data = true;
        Ok(page)
    }

    /// Create a new page under the given parent
    pub fn create(conn: &Connection, parent_id: Option<i64>, path: &PagePath) -> Result<i64> {
        if path.is_root() {
            return Err(Error::InvalidInput(
                "Cannot create a page at the root namespace".to_string(),
            ));
        }
        let now = datetime_to_timestamp(&chrono::Utc::now());
        conn.execute(
            "INSERT INTO pages (parent_id, basename, path, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![parent_id, path.basename(), path.as_str(), now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a page by ID, including its child-count flag
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Page> {
        let mut stmt = conn.prepare(
            "SELECT id, path, created_at,
                    EXISTS (SELECT 1 FROM pages c WHERE c.parent_id = pages.id)
             FROM pages WHERE id = ?1",
        )?;

        let page = stmt.query_row(params![id], Self::hydrated_page_from_row)?;

        Ok(page)
    }

    /// Look up a page by its full path. Returns a bare row without the
    /// child-count flag; use `hydrate` before descending into children.
    pub fn lookup_by_path(conn: &Connection, path: &PagePath) -> Result<Option<Page>> {
        let mut stmt = conn.prepare("SELECT id, path, created_at FROM pages WHERE path = ?1")?;

        match stmt.query_row(params![path.as_str()], Self::page_from_row) {
            Ok(page) => Ok(Some(page)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fill in `has_children` for a bare page row
    pub fn hydrate(conn: &Connection, page: Page) -> Result<Page> {
        if page.has_data {
            return Ok(page);
        }
        Self::get_by_id(conn, page.id)
    }

    /// List the children of a parent (None = root namespace), ordered by
    /// basename, with pagination
    pub fn list_children(
        conn: &Connection,
        parent_id: Option<i64>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Page>> {
        let query = match parent_id {
            Some(_) => {
                "SELECT id, path, created_at,
                        EXISTS (SELECT 1 FROM pages c WHERE c.parent_id = pages.id)
                 FROM pages WHERE parent_id = ?1 ORDER BY basename LIMIT ?2 OFFSET ?3"
            }
            None => {
                "SELECT id, path, created_at,
                        EXISTS (SELECT 1 FROM pages c WHERE c.parent_id = pages.id)
                 FROM pages WHERE parent_id IS NULL ORDER BY basename LIMIT ?1 OFFSET ?2"
            }
        };
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let offset = offset as i64;

        let mut stmt = conn.prepare(query)?;
        let pages = match parent_id {
            Some(pid) => stmt
                .query_map(params![pid, limit, offset], Self::hydrated_page_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![limit, offset], Self::hydrated_page_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(pages)
    }

    /// Count the children of a parent (None = root namespace)
    pub fn n_children(conn: &Connection, parent_id: Option<i64>) -> Result<usize> {
        let count: i64 = match parent_id {
            Some(pid) => conn.query_row(
                "SELECT COUNT(*) FROM pages WHERE parent_id = ?1",
                params![pid],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM pages WHERE parent_id IS NULL",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(count as usize)
    }

    /// Update a page's modified timestamp
    pub fn touch_modified(conn: &Connection, id: i64) -> Result<()> {
        let rows_affected = conn.execute(
            "UPDATE pages SET modified_at = ?1 WHERE id = ?2",
            params![datetime_to_timestamp(&chrono::Utc::now()), id],
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("Page not found: {}", id)));
        }

        Ok(())
    }

    /// Delete a page (children cascade)
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let rows_affected = conn.execute("DELETE FROM pages WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound(format!("Page not found: {}", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_create_and_lookup() {
        let (_dir, conn) = setup_test_db();

        let id = PageRepository::create(&conn, None, &PagePath::new("projects")).unwrap();
        assert!(id > 0);

        let page = PageRepository::lookup_by_path(&conn, &PagePath::new("projects"))
            .unwrap()
            .unwrap();
        assert_eq!(page.id, id);
        assert!(!page.has_data);

        let hydrated = PageRepository::hydrate(&conn, page).unwrap();
        assert!(hydrated.has_data);
        assert!(!hydrated.has_children);
    }

    #[test]
    fn test_lookup_missing() {
        let (_dir, conn) = setup_test_db();
        let result = PageRepository::lookup_by_path(&conn, &PagePath::new("nowhere")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_children_ordered_by_basename() {
        let (_dir, conn) = setup_test_db();

        let parent_id = PageRepository::create(&conn, None, &PagePath::new("projects")).unwrap();
        PageRepository::create(&conn, Some(parent_id), &PagePath::new("projects:zeta")).unwrap();
        PageRepository::create(&conn, Some(parent_id), &PagePath::new("projects:alpha")).unwrap();

        let children = PageRepository::list_children(&conn, Some(parent_id), 0, None).unwrap();
        let names: Vec<&str> = children.iter().map(|p| p.basename()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(PageRepository::n_children(&conn, Some(parent_id)).unwrap(), 2);

        // Parent is now hydrated with children
        let parent = PageRepository::get_by_id(&conn, parent_id).unwrap();
        assert!(parent.has_children);
    }

    #[test]
    fn test_pagination() {
        let (_dir, conn) = setup_test_db();

        for name in ["a", "b", "c", "d"] {
            PageRepository::create(&conn, None, &PagePath::new(name)).unwrap();
        }

        let window = PageRepository::list_children(&conn, None, 1, Some(2)).unwrap();
        let names: Vec<&str> = window.iter().map(|p| p.basename()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_delete_cascades() {
        let (_dir, conn) = setup_test_db();

        let parent_id = PageRepository::create(&conn, None, &PagePath::new("projects")).unwrap();
        PageRepository::create(&conn, Some(parent_id), &PagePath::new("projects:alpha")).unwrap();

        PageRepository::delete(&conn, parent_id).unwrap();
        assert!(PageRepository::lookup_by_path(&conn, &PagePath::new("projects:alpha"))
            .unwrap()
            .is_none());
    }
}
