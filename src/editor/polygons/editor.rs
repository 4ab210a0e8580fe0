//! The polygon editing state machine.
//!
//! [`PolygonEditor`] owns every polygon, the handle pools that draw them, the
//! selection, the mode and the undo history. Input arrives as backend-neutral
//! [`PointerEvent`]s and [`EditorCommand`]s; after each mutation the editor
//! writes the new geometry into its handles so the renderer only has to draw
//! what is visible.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::editor::history::{EditorSnapshot, HistoryStack, PolygonSnapshot};

use super::category::CategoryTable;
use super::error::EditorError;
use super::hit_testing::{self, Hit, HitTarget};
use super::input::{
    CursorHint, EditorCommand, PointerButton, PointerEvent, PointerKind, ViewportProjector,
};
use super::polygon::{MIN_CLOSED_POINTS, Polygon, PolygonId, PolygonShape};
use super::pool::{Drawables, PreviewEdge};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditorMode {
    #[default]
    Idle,
    /// Placing points of a new polygon
    Create,
    /// A polygon is selected for vertex editing
    #[serde(alias = "SELECT")]
    Edit,
}

impl EditorMode {
    pub fn label(&self) -> &'static str {
        match self {
            EditorMode::Idle => "Idle",
            EditorMode::Create => "Create",
            EditorMode::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VertexDrag {
    polygon: PolygonId,
    index: usize,
}

#[derive(Resource)]
pub struct PolygonEditor {
    polygons: Vec<Polygon>,
    selected: Option<PolygonId>,
    mode: EditorMode,
    next_id: PolygonId,
    drag: Option<VertexDrag>,
    categories: CategoryTable,
    vertex_threshold: f32,
    edge_threshold: f32,
    undo_threshold_px: f32,
    drawables: Drawables,
    history: HistoryStack,
    /// Last pointer position on the annotation plane
    cursor: Option<Vec3>,
    hover: CursorHint,
    last_error: Option<EditorError>,
}

impl Default for PolygonEditor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl PolygonEditor {
    pub fn new(config: &EditorConfig) -> Self {
        let drawables = if config.pooled {
            Drawables::pooled(config.vertex_pool_capacity, config.edge_pool_capacity)
        } else {
            Drawables::unpooled()
        };

        Self {
            polygons: Vec::new(),
            selected: None,
            mode: EditorMode::Idle,
            next_id: 1,
            drag: None,
            categories: CategoryTable::from_entries(&config.categories),
            vertex_threshold: config.vertex_threshold,
            edge_threshold: config.edge_threshold,
            undo_threshold_px: config.undo_threshold_px,
            drawables,
            history: HistoryStack::with_capacity(config.history_capacity),
            cursor: None,
            hover: CursorHint::Default,
            last_error: None,
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    pub fn selected_id(&self) -> Option<PolygonId> {
        self.selected
    }

    pub fn selected_polygon(&self) -> Option<&Polygon> {
        self.selected.and_then(|id| self.polygon(id))
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn drawables(&self) -> &Drawables {
        &self.drawables
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn cursor_hint(&self) -> CursorHint {
        self.hover
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The most recent refused operation, kept until the next click or command.
    pub fn last_error(&self) -> Option<&EditorError> {
        self.last_error.as_ref()
    }

    pub fn color_of(&self, polygon: &Polygon) -> u32 {
        self.categories.color_for(&polygon.category)
    }

    fn index_of(&self, id: PolygonId) -> Option<usize> {
        self.polygons.iter().position(|p| p.id == id)
    }

    fn selected_index(&self) -> Result<usize, EditorError> {
        self.selected
            .and_then(|id| self.index_of(id))
            .ok_or(EditorError::NoSelection)
    }

    fn allocate_id(&mut self) -> PolygonId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Push the current state onto the undo history
    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    fn remove_polygon(&mut self, index: usize) {
        let mut polygon = self.polygons.remove(index);
        polygon.release(&mut self.drawables);
    }

    fn clear_polygons(&mut self) {
        for mut polygon in std::mem::take(&mut self.polygons) {
            polygon.release(&mut self.drawables);
        }
    }

    fn reset_interaction(&mut self) {
        self.selected = None;
        self.mode = EditorMode::Idle;
        self.drag = None;
    }

    /// Close the selected draft, or discard it when it has too few points.
    fn finalize_draft(&mut self) {
        if let Ok(index) = self.selected_index() {
            self.finalize_at(index);
        }
    }

    /// Finalize every open polygon, so a new draft is the only one in progress.
    fn finalize_open_polygons(&mut self) {
        let open: Vec<PolygonId> = self
            .polygons
            .iter()
            .filter(|p| !p.closed)
            .map(|p| p.id)
            .collect();
        for id in open {
            if let Some(index) = self.index_of(id) {
                self.finalize_at(index);
            }
        }
    }

    fn finalize_at(&mut self, index: usize) {
        if self.polygons[index].closed {
            return;
        }

        let polygon = &mut self.polygons[index];
        if polygon.close(&mut self.drawables).is_ok() {
            polygon.active = false;
            info!("Closed polygon {} with {} points", polygon.id, polygon.len());
        } else {
            debug!("Discarding draft polygon {} with {} points", polygon.id, polygon.len());
            self.remove_polygon(index);
        }
    }

    /// Begin a new polygon in create mode, finalizing any pending draft first.
    pub fn start(&mut self) {
        self.finalize_open_polygons();
        self.record();

        let id = self.allocate_id();
        let mut polygon = Polygon::new(id, self.categories.default_name());
        polygon.active = true;
        self.polygons.push(polygon);

        self.selected = Some(id);
        self.mode = EditorMode::Create;
        self.drag = None;
        self.hover = CursorHint::Crosshair;
        self.render();
        debug!("Started polygon {}", id);
    }

    /// Append a point to the draft being created.
    pub fn append_point(&mut self, point: Vec3) -> Result<(), EditorError> {
        if self.mode != EditorMode::Create {
            return Err(EditorError::WrongMode);
        }
        let index = self.selected_index()?;
        if self.polygons[index].closed {
            return Err(EditorError::WrongMode);
        }
        if !point.is_finite() {
            return Err(EditorError::NonFiniteCoordinate);
        }

        self.record();
        self.polygons[index].append_point(point, &mut self.drawables)?;
        self.render();
        Ok(())
    }

    /// Remove the most recently placed point of the draft.
    pub fn pop_last_point(&mut self) -> Result<Vec3, EditorError> {
        if self.mode != EditorMode::Create {
            return Err(EditorError::WrongMode);
        }
        let index = self.selected_index()?;
        let polygon = &self.polygons[index];
        if polygon.closed {
            return Err(EditorError::WrongMode);
        }
        let last = polygon
            .len()
            .checked_sub(1)
            .ok_or(EditorError::IndexOutOfRange { index: 0, len: 0 })?;

        self.record();
        let removed = self.polygons[index].remove_point(last, &mut self.drawables)?;
        self.render();
        Ok(removed)
    }

    /// Leave the current operation: close or discard an open selection and return to idle.
    pub fn finish(&mut self) {
        if let Ok(index) = self.selected_index()
            && !self.polygons[index].closed
        {
            if !self.polygons[index].is_empty() {
                self.record();
            }
            self.finalize_draft();
        }

        self.reset_interaction();
        self.hover = CursorHint::Default;
        self.render();
    }

    /// Select a polygon for editing. Not a history step.
    pub fn select(&mut self, id: PolygonId) -> Result<(), EditorError> {
        if self.mode == EditorMode::Create {
            return Err(EditorError::WrongMode);
        }
        if self.index_of(id).is_none() {
            return Err(EditorError::NoSelection);
        }

        self.selected = Some(id);
        self.mode = EditorMode::Edit;
        self.drag = None;
        self.render();
        debug!("Selected polygon {}", id);
        Ok(())
    }

    /// Insert a point into the selected polygon so it lands at `index`.
    pub fn insert_point(&mut self, index: usize, point: Vec3) -> Result<(), EditorError> {
        let polygon_index = self.selected_index()?;
        if !point.is_finite() {
            return Err(EditorError::NonFiniteCoordinate);
        }
        let len = self.polygons[polygon_index].len();
        if index > len {
            return Err(EditorError::IndexOutOfRange { index, len });
        }

        self.record();
        self.polygons[polygon_index].insert_point(index, point, &mut self.drawables)?;
        self.render();
        Ok(())
    }

    /// Remove a point of the selected polygon, keeping at least 3 whether or
    /// not it is closed. Refusals leave history untouched.
    pub fn remove_point(&mut self, index: usize) -> Result<(), EditorError> {
        let polygon_index = self.selected_index()?;
        let polygon = &self.polygons[polygon_index];
        polygon.can_remove_point(index)?;
        if polygon.len() <= MIN_CLOSED_POINTS {
            return Err(EditorError::MinimumPoints { count: polygon.len() });
        }

        self.record();
        self.polygons[polygon_index].remove_point(index, &mut self.drawables)?;
        self.render();
        Ok(())
    }

    /// Move a point of the selected polygon without recording history.
    pub fn move_point(&mut self, index: usize, point: Vec3) -> Result<(), EditorError> {
        let polygon_index = self.selected_index()?;
        self.polygons[polygon_index].move_point(index, point)?;
        self.render();
        Ok(())
    }

    /// Start dragging a vertex of the selected polygon. One history step covers the whole drag.
    pub fn begin_drag(&mut self, index: usize) -> Result<(), EditorError> {
        let polygon_index = self.selected_index()?;
        let polygon = &self.polygons[polygon_index];
        if index >= polygon.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: polygon.len(),
            });
        }
        let drag = VertexDrag {
            polygon: polygon.id,
            index,
        };

        self.record();
        self.drag = Some(drag);
        self.hover = CursorHint::Grab;
        Ok(())
    }

    pub fn drag_to(&mut self, point: Vec3) -> Result<(), EditorError> {
        let Some(drag) = self.drag else {
            return Ok(());
        };
        let polygon_index = self.index_of(drag.polygon).ok_or(EditorError::NoSelection)?;
        self.polygons[polygon_index].move_point(drag.index, point)?;
        self.render();
        Ok(())
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Step the selected polygon's category through the table.
    pub fn cycle_category(&mut self, direction: i32) -> Result<(), EditorError> {
        let index = self.selected_index()?;
        let next = self
            .categories
            .cycle(&self.polygons[index].category, direction)
            .to_string();

        self.record();
        self.polygons[index].set_category(next);
        self.render();
        Ok(())
    }

    /// Assign a category to the selected polygon by name.
    pub fn set_selected_category(&mut self, name: &str) -> Result<(), EditorError> {
        let index = self.selected_index()?;
        if self.polygons[index].category == name {
            return Ok(());
        }

        self.record();
        self.polygons[index].set_category(name);
        self.render();
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), EditorError> {
        let index = self.selected_index()?;
        self.record();

        let id = self.polygons[index].id;
        self.remove_polygon(index);
        self.reset_interaction();
        self.render();
        info!("Deleted polygon {}", id);
        Ok(())
    }

    /// Remove every polygon, as one history step.
    pub fn clear(&mut self) {
        self.record();
        self.clear_polygons();
        self.reset_interaction();
        self.render();
    }

    /// Restore the previous snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(&previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(&next);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            polygons: self
                .polygons
                .iter()
                .map(|p| PolygonSnapshot::from_polygon(p, self.color_of(p)))
                .collect(),
            selected_id: self.selected,
            mode: self.mode,
        }
    }

    /// Replace all state with a snapshot, rebuilding every handle. The mode is always reset to idle.
    pub fn restore(&mut self, snapshot: &EditorSnapshot) {
        self.clear_polygons();

        for entry in &snapshot.polygons {
            if self.index_of(entry.id).is_some() {
                warn!("Skipping duplicate polygon id {} in snapshot", entry.id);
                continue;
            }

            let category = entry
                .category
                .clone()
                .or_else(|| self.categories.name_for_color(entry.color).map(str::to_string))
                .unwrap_or_else(|| self.categories.default_name().to_string());
            let points = entry.finite_points();
            let closed = entry.is_closed() && points.len() >= MIN_CLOSED_POINTS;

            let mut polygon =
                Polygon::from_points(entry.id, category, points, closed, &mut self.drawables);
            // Restored state is idle, so no draft is in progress
            polygon.active = false;
            self.next_id = self.next_id.max(entry.id.saturating_add(1));
            self.polygons.push(polygon);
        }

        self.selected = snapshot
            .selected_id
            .filter(|id| self.index_of(*id).is_some());
        self.mode = EditorMode::Idle;
        self.drag = None;
        self.render();
    }

    /// Open a saved document as one history step.
    pub fn load_snapshot(&mut self, snapshot: &EditorSnapshot, categories: Option<CategoryTable>) {
        self.record();
        if let Some(table) = categories {
            self.categories = table;
        }
        self.restore(snapshot);
        info!("Loaded {} polygons from snapshot", self.polygons.len());
    }

    /// Replace every polygon with imported closed shapes as one history step.
    /// Shapes with fewer than 3 finite points are dropped. Returns the number kept.
    pub fn replace_polygons(
        &mut self,
        shapes: Vec<PolygonShape>,
        categories: Option<CategoryTable>,
    ) -> usize {
        self.record();
        if let Some(table) = categories {
            self.categories = table;
        }
        self.clear_polygons();

        for shape in shapes {
            let points: Vec<Vec3> = shape.points.into_iter().filter(|p| p.is_finite()).collect();
            if points.len() < MIN_CLOSED_POINTS {
                continue;
            }
            let id = self.allocate_id();
            let polygon = Polygon::from_points(id, shape.category, points, true, &mut self.drawables);
            self.polygons.push(polygon);
        }

        self.reset_interaction();
        self.render();
        self.polygons.len()
    }

    /// Feed one pointer event through the state machine.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        projector: &impl ViewportProjector,
    ) -> Result<(), EditorError> {
        let world = projector.screen_to_world(event.screen);

        let result = match event.kind {
            PointerKind::Move => self.pointer_moved(world),
            PointerKind::Down => {
                self.last_error = None;
                match (self.mode, event.button) {
                    (EditorMode::Create, Some(PointerButton::Primary)) => match world {
                        Some(point) => self.append_point(point),
                        None => Ok(()),
                    },
                    (EditorMode::Create, Some(PointerButton::Secondary)) => {
                        self.remove_last_if_near(event.screen, projector)
                    }
                    (EditorMode::Create, _) => Ok(()),
                    (_, Some(button @ (PointerButton::Primary | PointerButton::Secondary))) => {
                        match world {
                            Some(point) => self.pointer_down_on_canvas(button, point),
                            None => Ok(()),
                        }
                    }
                    _ => Ok(()),
                }
            }
            PointerKind::Up => {
                self.end_drag();
                Ok(())
            }
        };

        self.note(result)
    }

    pub fn handle_command(&mut self, command: EditorCommand) -> Result<(), EditorError> {
        self.last_error = None;
        let result = match command {
            EditorCommand::StartCreate => {
                self.start();
                Ok(())
            }
            EditorCommand::Finish => {
                self.finish();
                Ok(())
            }
            EditorCommand::DeleteSelected => self.delete_selected(),
            EditorCommand::CycleCategory(direction) => self.cycle_category(direction),
            EditorCommand::Undo => {
                if !self.undo() {
                    debug!("Nothing to undo");
                }
                Ok(())
            }
            EditorCommand::Redo => {
                if !self.redo() {
                    debug!("Nothing to redo");
                }
                Ok(())
            }
        };

        self.note(result)
    }

    fn note<T>(&mut self, result: Result<T, EditorError>) -> Result<T, EditorError> {
        if let Err(err) = &result {
            debug!("Editor operation refused: {}", err);
            self.last_error = Some(err.clone());
        }
        result
    }

    fn remove_last_if_near(
        &mut self,
        screen: Vec2,
        projector: &impl ViewportProjector,
    ) -> Result<(), EditorError> {
        let index = self.selected_index()?;
        let Some(last) = self.polygons[index].last_point() else {
            return Ok(());
        };

        if hit_testing::is_cursor_near_point(screen, last, projector, self.undo_threshold_px) {
            self.pop_last_point()?;
        }
        Ok(())
    }

    fn pointer_down_on_canvas(
        &mut self,
        button: PointerButton,
        point: Vec3,
    ) -> Result<(), EditorError> {
        let Some(hit) = self.hit(point) else {
            return Ok(());
        };

        if self.selected != Some(hit.polygon) {
            return self.select(hit.polygon);
        }

        match (button, hit.target) {
            (PointerButton::Primary, HitTarget::Vertex(index)) => self.begin_drag(index),
            (PointerButton::Secondary, HitTarget::Vertex(index)) => self.remove_point(index),
            (PointerButton::Primary, HitTarget::Edge(index)) => self.insert_point(index + 1, point),
            _ => Ok(()),
        }
    }

    fn pointer_moved(&mut self, world: Option<Vec3>) -> Result<(), EditorError> {
        self.cursor = world;

        if self.drag.is_some() {
            self.hover = CursorHint::Grab;
            return match world {
                Some(point) => self.drag_to(point),
                None => Ok(()),
            };
        }

        self.hover = self.hover_hint(world);
        if self.mode == EditorMode::Create {
            self.render_preview();
        }
        Ok(())
    }

    fn hit(&self, point: Vec3) -> Option<Hit> {
        hit_testing::find_nearest(
            point,
            &self.polygons,
            self.vertex_threshold,
            self.edge_threshold,
        )
    }

    fn hover_hint(&self, world: Option<Vec3>) -> CursorHint {
        if self.mode == EditorMode::Create {
            return CursorHint::Crosshair;
        }
        let Some(point) = world else {
            return CursorHint::Default;
        };

        match self.hit(point) {
            None => CursorHint::Default,
            Some(hit) if self.selected != Some(hit.polygon) => CursorHint::Pointer,
            Some(Hit {
                target: HitTarget::Vertex(_),
                ..
            }) => CursorHint::Grab,
            Some(Hit {
                target: HitTarget::Edge(_),
                ..
            }) => CursorHint::Insert,
        }
    }

    /// Write every polygon and the create preview into the drawable handles.
    fn render(&mut self) {
        for polygon in &self.polygons {
            let color = self.categories.color_for(&polygon.category);
            let show_vertices = self.selected == Some(polygon.id);
            polygon.render(&mut self.drawables, color, show_vertices);
        }
        self.render_preview();
    }

    /// Preview runs from the last placed point through the cursor, back to the first point.
    fn render_preview(&mut self) {
        let draft_index = match self.mode {
            EditorMode::Create => self.selected_index().ok(),
            _ => None,
        };

        let preview = draft_index
            .map(|index| &self.polygons[index])
            .filter(|draft| !draft.closed)
            .zip(self.cursor)
            .and_then(|(draft, cursor)| {
                let first = draft.points.first()?;
                let last = draft.last_point()?;
                let mut points = vec![last, cursor];
                if draft.len() >= 2 {
                    points.push(*first);
                }
                Some(PreviewEdge {
                    points,
                    color: self.categories.color_for(&draft.category),
                    visible: true,
                })
            });

        match preview {
            Some(preview) => self.drawables.preview = preview,
            None => self.drawables.hide_preview(),
        }
    }
}
