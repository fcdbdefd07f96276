//! Collapse flat parent/child join rows into nested parents.
//!
//! A `LEFT JOIN` of parents against their media yields one row per
//! (parent, media) pair, or a single row with null media columns for a
//! parent without media. [`collapse`] folds those rows back into one value
//! per parent, keeping parents in the order they were first seen and
//! children in row order.

use std::collections::HashMap;

use uuid::Uuid;

use super::models::{Log, MediaItem, Vehicle};

/// A parent record that owns a list of children.
pub trait Parent {
    type Child;

    fn key(&self) -> Uuid;
    fn children_mut(&mut self) -> &mut Vec<Self::Child>;
}

/// One decoded join row: the parent columns plus the child columns, if any.
pub struct Joined<P: Parent> {
    pub parent: P,
    pub child: Option<P::Child>,
}

impl<P: Parent> Joined<P> {
    pub fn new(parent: P, child: Option<P::Child>) -> Self {
        Self { parent, child }
    }
}

/// Fold joined rows into parents with their children attached.
///
/// The first error aborts the whole fold; no partial result escapes.
pub fn collapse<P, E, I>(rows: I) -> Result<Vec<P>, E>
where
    P: Parent,
    I: IntoIterator<Item = Result<Joined<P>, E>>,
{
    let mut parents: Vec<P> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let Joined { mut parent, child } = row?;
        let key = parent.key();

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                parent.children_mut().clear();
                parents.push(parent);
                index.insert(key, parents.len() - 1);
                parents.len() - 1
            }
        };

        if let Some(child) = child {
            parents[slot].children_mut().push(child);
        }
    }

    Ok(parents)
}

impl Parent for Vehicle {
    type Child = MediaItem;

    fn key(&self) -> Uuid {
        self.id
    }

    fn children_mut(&mut self) -> &mut Vec<MediaItem> {
        &mut self.media
    }
}

impl Parent for Log {
    type Child = MediaItem;

    fn key(&self) -> Uuid {
        self.id
    }

    fn children_mut(&mut self) -> &mut Vec<MediaItem> {
        &mut self.media
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn log(id: Uuid) -> Log {
        Log {
            id,
            vehicle_id: Uuid::nil(),
            category: "service".to_string(),
            title: "Oil change".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: String::new(),
            notes: String::new(),
            cost: Decimal::new(4999, 2),
            created_at: Utc::now(),
            media: Vec::new(),
        }
    }

    fn media(name: &str) -> MediaItem {
        MediaItem {
            id: Uuid::new_v4(),
            filename: name.to_string(),
            file_type: "image/jpeg".to_string(),
            location: format!("https://store.example/{}", name),
        }
    }

    fn ok(parent: Log, child: Option<MediaItem>) -> Result<Joined<Log>, String> {
        Ok(Joined::new(parent, child))
    }

    #[test]
    fn parent_without_media_has_empty_collection() {
        let id = Uuid::new_v4();
        let logs = collapse(vec![ok(log(id), None)]).unwrap();

        assert_eq!(logs.len(), 1);
        assert!(logs[0].media.is_empty());
    }

    #[test]
    fn three_media_rows_collapse_into_one_parent() {
        let id = Uuid::new_v4();
        let rows = vec![
            ok(log(id), Some(media("a.jpg"))),
            ok(log(id), Some(media("b.jpg"))),
            ok(log(id), Some(media("c.jpg"))),
        ];
        let logs = collapse(rows).unwrap();

        assert_eq!(logs.len(), 1);
        let names: Vec<&str> = logs[0].media.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn parents_keep_first_seen_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            ok(log(b), Some(media("b1"))),
            ok(log(a), None),
            ok(log(b), Some(media("b2"))),
            ok(log(c), Some(media("c1"))),
        ];
        let logs = collapse(rows).unwrap();

        let ids: Vec<Uuid> = logs.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![b, a, c]);
        assert_eq!(logs[0].media.len(), 2);
        assert!(logs[1].media.is_empty());
        assert_eq!(logs[2].media.len(), 1);
    }

    #[test]
    fn decode_error_aborts_everything() {
        let id = Uuid::new_v4();
        let rows = vec![
            ok(log(id), Some(media("a"))),
            Err("column media_filename is null".to_string()),
            ok(log(id), Some(media("b"))),
        ];

        let result = collapse(rows);
        assert_eq!(result.unwrap_err(), "column media_filename is null");
    }

    #[test]
    fn empty_input_is_empty_output() {
        let rows: Vec<Result<Joined<Log>, String>> = Vec::new();
        assert!(collapse(rows).unwrap().is_empty());
    }
}
