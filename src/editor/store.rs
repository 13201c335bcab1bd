// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered annotation collection with copy-on-write updates.
//!
//! Every mutating operation takes `&self` and returns a new store built
//! from a fresh copy of the entries. Snapshots already handed out (for
//! example to the renderer) keep seeing the old entries.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::annotation::{Annotation, OrganismClass, Point, Shape, ORGANISM_CLASSES};

/// Immutable snapshot of the annotation list.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    items: Arc<[Annotation]>,
}

impl PartialEq for AnnotationStore {
    fn eq(&self, other: &Self) -> bool {
        self.items[..] == other.items[..]
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    /// Index of the selected annotation, if any.
    pub fn selected(&self) -> Option<usize> {
        self.items.iter().position(|a| a.selected)
    }

    /// Build a new store from a modified copy of the entries.
    fn with(&self, f: impl FnOnce(&mut Vec<Annotation>)) -> Self {
        let mut items = self.items.to_vec();
        f(&mut items);
        Self {
            items: items.into(),
        }
    }

    fn deselect(items: &mut [Annotation]) {
        for item in items.iter_mut() {
            item.selected = false;
        }
    }

    /// Append a selected annotation with a randomly chosen class.
    pub fn add<R: Rng + ?Sized>(&self, shape: Shape, rng: &mut R) -> Self {
        let class = ORGANISM_CLASSES
            .choose(rng)
            .copied()
            .unwrap_or(ORGANISM_CLASSES[0]);
        self.add_with_class(shape, &class)
    }

    /// Append a selected annotation with the given class. All others are deselected.
    pub fn add_with_class(&self, shape: Shape, class: &OrganismClass) -> Self {
        self.with(|items| {
            Self::deselect(items);
            let mut annotation = Annotation::new(shape, class);
            annotation.selected = true;
            items.push(annotation);
        })
    }

    /// Make `index` the only selected annotation. Out of range is a no-op.
    pub fn select(&self, index: usize) -> Self {
        if index >= self.len() {
            log::warn!("Ignoring selection of annotation {} (have {})", index, self.len());
            return self.clone();
        }
        self.with(|items| {
            Self::deselect(items);
            items[index].selected = true;
        })
    }

    /// Remove the annotation at `index`, shifting later entries down.
    pub fn delete(&self, index: usize) -> Self {
        if index >= self.len() {
            log::warn!("Ignoring delete of annotation {} (have {})", index, self.len());
            return self.clone();
        }
        self.with(|items| {
            items.remove(index);
        })
    }

    /// Reassign class and colour, leaving selection and description alone.
    pub fn set_class(&self, index: usize, organism_class: &str, color: &str) -> Self {
        if index >= self.len() {
            return self.clone();
        }
        self.with(|items| {
            items[index].organism_class = organism_class.to_string();
            items[index].color = color.to_string();
        })
    }

    pub fn set_description(&self, index: usize, text: &str) -> Self {
        if index >= self.len() {
            return self.clone();
        }
        self.with(|items| items[index].description = text.to_string())
    }

    /// Replace every entry. Selection flags are taken as given.
    pub fn replace_all(&self, annotations: Vec<Annotation>) -> Self {
        Self {
            items: annotations.into(),
        }
    }

    /// Topmost annotation whose outline is within `tolerance` of `point`.
    ///
    /// Later entries are painted over earlier ones, so the search runs
    /// back to front.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .rev()
            .find(|(_, a)| a.shape.outline_distance(&point) <= tolerance)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rect(x: f64) -> Shape {
        Shape::Rectangle {
            x,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        }
    }

    fn selected_count(store: &AnnotationStore) -> usize {
        store.iter().filter(|a| a.selected).count()
    }

    fn store_of(n: usize) -> AnnotationStore {
        let mut rng = StdRng::seed_from_u64(7);
        (0..n).fold(AnnotationStore::new(), |store, i| {
            store.add(rect(i as f64 * 100.0), &mut rng)
        })
    }

    #[test]
    fn test_add_selects_only_new_entry() {
        let store = store_of(3);

        assert_eq!(store.len(), 3);
        assert_eq!(selected_count(&store), 1);
        assert_eq!(store.selected(), Some(2));

        let last = store.get(2).unwrap();
        assert!(ORGANISM_CLASSES
            .iter()
            .any(|c| c.name == last.organism_class && c.color == last.color));
        assert!(last.description.is_empty());
    }

    #[test]
    fn test_select_is_exclusive() {
        let store = store_of(4).select(1);
        assert_eq!(selected_count(&store), 1);
        assert_eq!(store.selected(), Some(1));

        let unchanged = store.select(99);
        assert_eq!(unchanged, store);
    }

    #[test]
    fn test_delete_preserves_order() {
        let store = store_of(4).select(0);
        let before: Vec<Shape> = store.iter().map(|a| a.shape).collect();

        let after = store.delete(1);
        assert_eq!(after.len(), 3);
        let shapes: Vec<Shape> = after.iter().map(|a| a.shape).collect();
        assert_eq!(shapes, vec![before[0], before[2], before[3]]);
        assert_eq!(after.selected(), Some(0));

        let removed_selected = after.delete(0);
        assert_eq!(removed_selected.selected(), None);
    }

    #[test]
    fn test_set_class_and_description() {
        let store = store_of(2);
        let store = store.set_class(0, "Virus", "#3cb44b");
        let store = store.set_description(0, "cluster near edge");

        let first = store.get(0).unwrap();
        assert_eq!(first.organism_class, "Virus");
        assert_eq!(first.color, "#3cb44b");
        assert_eq!(first.description, "cluster near edge");
        assert!(!first.selected);
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn test_mutation_does_not_touch_snapshot() {
        let snapshot = store_of(2);
        let changed = snapshot.set_description(0, "edited").delete(1);

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get(0).unwrap().description.is_empty());
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn test_replace_all_keeps_flags() {
        let mut a = Annotation::new(rect(0.0), &ORGANISM_CLASSES[1]);
        a.selected = true;
        let mut b = Annotation::new(rect(50.0), &ORGANISM_CLASSES[2]);
        b.selected = true;

        let store = store_of(3).replace_all(vec![a, b]);
        assert_eq!(store.len(), 2);
        assert_eq!(selected_count(&store), 2);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let store = AnnotationStore::new()
            .add_with_class(rect(0.0), &ORGANISM_CLASSES[0])
            .add_with_class(rect(0.0), &ORGANISM_CLASSES[1]);

        assert_eq!(store.hit_test(Point::new(0.5, 5.0), 1.0), Some(1));
        assert_eq!(store.hit_test(Point::new(5.0, 5.0), 1.0), None);
        assert_eq!(store.hit_test(Point::new(300.0, 5.0), 1.0), None);
    }
}
