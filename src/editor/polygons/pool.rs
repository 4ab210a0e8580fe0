//! Recycling pools for the vertex and edge handles that draw polygons.
//!
//! A handle is plain data (position, color, visibility, owner). The gizmo
//! renderer draws every visible handle each frame, so a freed handle must be
//! hidden the moment it is released.

use bevy::prelude::*;

use super::error::EditorError;
use super::polygon::PolygonId;

/// A slot type that can be reset to an invisible, ownerless state.
pub trait Drawable: Default {
    fn reset(&mut self);
}

/// Marker on a vertex of a polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexHandle {
    pub position: Vec3,
    pub color: u32,
    pub visible: bool,
    pub owner: Option<PolygonId>,
}

impl Drawable for VertexHandle {
    fn reset(&mut self) {
        self.visible = false;
        self.owner = None;
    }
}

/// Line segment between two consecutive points of a polygon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeHandle {
    pub start: Vec3,
    pub end: Vec3,
    pub color: u32,
    pub visible: bool,
    pub owner: Option<PolygonId>,
}

impl Drawable for EdgeHandle {
    fn reset(&mut self) {
        self.visible = false;
        self.owner = None;
    }
}

/// Dashed preview from the last placed point through the cursor back to the first point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewEdge {
    pub points: Vec<Vec3>,
    pub color: u32,
    pub visible: bool,
}

/// Fixed or growable array of handles with a parallel usage table.
#[derive(Debug, Clone)]
pub struct HandlePool<T> {
    slots: Vec<T>,
    in_use: Vec<bool>,
    fixed: bool,
}

impl<T: Drawable> HandlePool<T> {
    /// Pool with a fixed number of pre-created slots; never grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            in_use: vec![false; capacity],
            fixed: true,
        }
    }

    /// Pool that creates a new slot whenever every existing one is taken.
    pub fn growable() -> Self {
        Self {
            slots: Vec::new(),
            in_use: Vec::new(),
            fixed: false,
        }
    }

    /// Claim the lowest free slot.
    pub fn allocate(&mut self) -> Result<usize, EditorError> {
        if let Some(index) = self.in_use.iter().position(|used| !used) {
            self.in_use[index] = true;
            return Ok(index);
        }

        if self.fixed {
            return Err(EditorError::PoolExhausted);
        }

        self.slots.push(T::default());
        self.in_use.push(true);
        Ok(self.slots.len() - 1)
    }

    /// Release a slot. Freeing a free or out-of-range index does nothing.
    pub fn free(&mut self, index: usize) {
        if let Some(used) = self.in_use.get_mut(index)
            && *used
        {
            *used = false;
            self.slots[index].reset();
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    /// Mutable access to a slot, only while it is in use.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.is_in_use(index) {
            self.slots.get_mut(index)
        } else {
            None
        }
    }

    pub fn is_in_use(&self, index: usize) -> bool {
        self.in_use.get(index).copied().unwrap_or(false)
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.iter().filter(|used| **used).count()
    }

    /// Number of slots currently backing the pool.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Slots that are currently claimed.
    pub fn iter_in_use(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(index, _)| self.in_use[*index])
    }
}

/// All drawable state for the editor: vertex pool, edge pool, and the create preview.
#[derive(Debug, Clone)]
pub struct Drawables {
    pub vertices: HandlePool<VertexHandle>,
    pub edges: HandlePool<EdgeHandle>,
    pub preview: PreviewEdge,
}

impl Drawables {
    pub fn pooled(vertex_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            vertices: HandlePool::with_capacity(vertex_capacity),
            edges: HandlePool::with_capacity(edge_capacity),
            preview: PreviewEdge::default(),
        }
    }

    pub fn unpooled() -> Self {
        Self {
            vertices: HandlePool::growable(),
            edges: HandlePool::growable(),
            preview: PreviewEdge::default(),
        }
    }

    /// Claim a vertex handle for `owner`, or `None` when the pool is exhausted.
    pub fn allocate_vertex(&mut self, owner: PolygonId) -> Option<usize> {
        match self.vertices.allocate() {
            Ok(index) => {
                if let Some(handle) = self.vertices.get_mut(index) {
                    handle.owner = Some(owner);
                }
                Some(index)
            }
            Err(err) => {
                warn!("Skipping vertex handle for polygon {}: {}", owner, err);
                None
            }
        }
    }

    /// Claim an edge handle for `owner`, or `None` when the pool is exhausted.
    pub fn allocate_edge(&mut self, owner: PolygonId) -> Option<usize> {
        match self.edges.allocate() {
            Ok(index) => {
                if let Some(handle) = self.edges.get_mut(index) {
                    handle.owner = Some(owner);
                }
                Some(index)
            }
            Err(err) => {
                warn!("Skipping edge handle for polygon {}: {}", owner, err);
                None
            }
        }
    }

    /// Polygon that owns the given vertex handle.
    pub fn vertex_owner(&self, index: usize) -> Option<PolygonId> {
        if !self.vertices.is_in_use(index) {
            return None;
        }
        self.vertices.get(index).and_then(|handle| handle.owner)
    }

    /// Polygon that owns the given edge handle.
    pub fn edge_owner(&self, index: usize) -> Option<PolygonId> {
        if !self.edges.is_in_use(index) {
            return None;
        }
        self.edges.get(index).and_then(|handle| handle.owner)
    }

    pub fn hide_preview(&mut self) {
        self.preview.visible = false;
        self.preview.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_until_exhausted() {
        let mut pool: HandlePool<VertexHandle> = HandlePool::with_capacity(3);
        assert_eq!(pool.allocate(), Ok(0));
        assert_eq!(pool.allocate(), Ok(1));
        assert_eq!(pool.allocate(), Ok(2));
        assert_eq!(pool.allocate(), Err(EditorError::PoolExhausted));
    }

    #[test]
    fn test_free_then_allocate_reuses_slot() {
        let mut pool: HandlePool<VertexHandle> = HandlePool::with_capacity(3);
        for _ in 0..3 {
            pool.allocate().unwrap();
        }
        pool.free(1);
        assert_eq!(pool.allocate(), Ok(1));
        assert_eq!(pool.allocate(), Err(EditorError::PoolExhausted));
    }

    #[test]
    fn test_lowest_free_index_wins() {
        let mut pool: HandlePool<EdgeHandle> = HandlePool::with_capacity(5);
        for _ in 0..5 {
            pool.allocate().unwrap();
        }
        pool.free(3);
        pool.free(1);
        assert_eq!(pool.allocate(), Ok(1));
        assert_eq!(pool.allocate(), Ok(3));
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut pool: HandlePool<VertexHandle> = HandlePool::with_capacity(2);
        let index = pool.allocate().unwrap();
        pool.free(index);
        pool.free(index);
        pool.free(99);
        assert_eq!(pool.in_use_count(), 0);
    }

    #[test]
    fn test_free_hides_handle() {
        let mut pool: HandlePool<VertexHandle> = HandlePool::with_capacity(1);
        let index = pool.allocate().unwrap();
        {
            let handle = pool.get_mut(index).unwrap();
            handle.visible = true;
            handle.owner = Some(4);
        }
        pool.free(index);
        let handle = pool.get(index).unwrap();
        assert!(!handle.visible);
        assert!(handle.owner.is_none());
        assert!(pool.get_mut(index).is_none());
    }

    #[test]
    fn test_growable_pool_never_exhausts() {
        let mut pool: HandlePool<VertexHandle> = HandlePool::growable();
        for expected in 0..50 {
            assert_eq!(pool.allocate(), Ok(expected));
        }
        pool.free(10);
        assert_eq!(pool.allocate(), Ok(10));
        assert_eq!(pool.capacity(), 50);
        assert!(!pool.is_fixed());
    }

    #[test]
    fn test_drawables_records_owner() {
        let mut drawables = Drawables::pooled(2, 2);
        let vertex = drawables.allocate_vertex(7).unwrap();
        let edge = drawables.allocate_edge(7).unwrap();
        assert_eq!(drawables.vertex_owner(vertex), Some(7));
        assert_eq!(drawables.edge_owner(edge), Some(7));

        drawables.vertices.free(vertex);
        assert_eq!(drawables.vertex_owner(vertex), None);
    }

    #[test]
    fn test_drawables_exhaustion_is_skipped() {
        let mut drawables = Drawables::pooled(1, 0);
        assert!(drawables.allocate_vertex(1).is_some());
        assert!(drawables.allocate_vertex(1).is_none());
        assert!(drawables.allocate_edge(1).is_none());
    }
}
