//! A single polygon annotation and the handles that draw it.

use bevy::prelude::*;

use super::error::EditorError;
use super::pool::Drawables;

pub type PolygonId = u64;

/// Smallest number of points a closed polygon may have.
pub const MIN_CLOSED_POINTS: usize = 3;

/// Geometry and category of a polygon that has no id or handles yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub category: String,
    pub points: Vec<Vec3>,
}

/// An ordered point chain with one category.
///
/// `vertex_handles[i]` draws `points[i]`; `None` means the vertex pool was
/// exhausted when the point was added. Edge handles are derived and rebuilt
/// whenever the point list changes shape.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub id: PolygonId,
    pub points: Vec<Vec3>,
    pub category: String,
    pub closed: bool,
    pub active: bool,
    vertex_handles: Vec<Option<usize>>,
    edge_handles: Vec<Option<usize>>,
}

fn ensure_finite(point: Vec3) -> Result<(), EditorError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(EditorError::NonFiniteCoordinate)
    }
}

impl Polygon {
    pub fn new(id: PolygonId, category: impl Into<String>) -> Self {
        Self {
            id,
            points: Vec::new(),
            category: category.into(),
            closed: false,
            active: false,
            vertex_handles: Vec::new(),
            edge_handles: Vec::new(),
        }
    }

    /// Build a polygon from existing geometry, allocating all of its handles.
    pub fn from_points(
        id: PolygonId,
        category: impl Into<String>,
        points: Vec<Vec3>,
        closed: bool,
        drawables: &mut Drawables,
    ) -> Self {
        let mut polygon = Self::new(id, category);
        polygon.closed = closed;
        polygon.vertex_handles = points
            .iter()
            .map(|_| drawables.allocate_vertex(id))
            .collect();
        polygon.points = points;
        polygon.rebuild_edges(drawables);
        polygon
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    pub fn vertex_handles(&self) -> &[Option<usize>] {
        &self.vertex_handles
    }

    pub fn edge_handles(&self) -> &[Option<usize>] {
        &self.edge_handles
    }

    /// Number of edges implied by the point list.
    pub fn edge_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }

    /// Edges as `(index, start, end)`, wrapping last to first only when closed.
    pub fn edges(&self) -> impl Iterator<Item = (usize, Vec3, Vec3)> + '_ {
        let len = self.points.len();
        (0..self.edge_count()).map(move |i| (i, self.points[i], self.points[(i + 1) % len]))
    }

    pub fn append_point(&mut self, point: Vec3, drawables: &mut Drawables) -> Result<(), EditorError> {
        ensure_finite(point)?;
        self.points.push(point);
        self.vertex_handles.push(drawables.allocate_vertex(self.id));

        if self.closed {
            self.rebuild_edges(drawables);
        } else if self.points.len() >= 2 {
            let edge = drawables.allocate_edge(self.id);
            self.edge_handles.push(edge);
        }
        self.check_alignment();
        Ok(())
    }

    /// Insert `point` so that it ends up at `index`; later points shift right.
    pub fn insert_point(
        &mut self,
        index: usize,
        point: Vec3,
        drawables: &mut Drawables,
    ) -> Result<(), EditorError> {
        ensure_finite(point)?;
        if index > self.points.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }

        self.points.insert(index, point);
        self.vertex_handles
            .insert(index, drawables.allocate_vertex(self.id));
        self.rebuild_edges(drawables);
        self.check_alignment();
        Ok(())
    }

    /// Check whether `remove_point(index)` would be accepted.
    pub fn can_remove_point(&self, index: usize) -> Result<(), EditorError> {
        let len = self.points.len();
        if index >= len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }
        if self.closed && len - 1 < MIN_CLOSED_POINTS {
            return Err(EditorError::MinimumPoints { count: len });
        }
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize, drawables: &mut Drawables) -> Result<Vec3, EditorError> {
        self.can_remove_point(index)?;

        if let Some(handle) = self.vertex_handles.remove(index) {
            drawables.vertices.free(handle);
        }
        let removed = self.points.remove(index);
        self.rebuild_edges(drawables);
        self.check_alignment();
        Ok(removed)
    }

    /// Move a point in place. Edge handles are kept; only positions change.
    pub fn move_point(&mut self, index: usize, point: Vec3) -> Result<(), EditorError> {
        ensure_finite(point)?;
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(EditorError::IndexOutOfRange { index, len })?;
        *slot = point;
        Ok(())
    }

    pub fn set_category(&mut self, name: impl Into<String>) {
        self.category = name.into();
    }

    pub fn close(&mut self, drawables: &mut Drawables) -> Result<(), EditorError> {
        if self.points.len() < MIN_CLOSED_POINTS {
            return Err(EditorError::MinimumPoints {
                count: self.points.len(),
            });
        }
        self.closed = true;
        self.rebuild_edges(drawables);
        Ok(())
    }

    /// Free every handle this polygon holds.
    pub fn release(&mut self, drawables: &mut Drawables) {
        for handle in self.vertex_handles.iter_mut() {
            if let Some(index) = handle.take() {
                drawables.vertices.free(index);
            }
        }
        for index in self.edge_handles.drain(..).flatten() {
            drawables.edges.free(index);
        }
    }

    fn rebuild_edges(&mut self, drawables: &mut Drawables) {
        for index in self.edge_handles.drain(..).flatten() {
            drawables.edges.free(index);
        }
        let count = self.edge_count();
        self.edge_handles = (0..count).map(|_| drawables.allocate_edge(self.id)).collect();
    }

    /// Write the current geometry into this polygon's handles.
    pub fn render(&self, drawables: &mut Drawables, color: u32, show_vertices: bool) {
        for (point, handle) in self.points.iter().zip(&self.vertex_handles) {
            if let Some(vertex) = handle.and_then(|index| drawables.vertices.get_mut(index)) {
                vertex.position = *point;
                vertex.color = color;
                vertex.visible = show_vertices;
            }
        }

        for ((_, start, end), handle) in self.edges().zip(&self.edge_handles) {
            if let Some(edge) = handle.and_then(|index| drawables.edges.get_mut(index)) {
                edge.start = start;
                edge.end = end;
                edge.color = color;
                edge.visible = true;
            }
        }
    }

    fn check_alignment(&self) {
        debug_assert_eq!(
            self.points.len(),
            self.vertex_handles.len(),
            "polygon {} vertex handles out of step with points",
            self.id
        );
        debug_assert_eq!(self.edge_handles.len(), self.edge_count());
    }
}
