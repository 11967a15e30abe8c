// Headless grid engine - in-memory node bookkeeping without a UI
use crate::application::render::{GridEngine, GridNode, RenderResult};
use crate::domain::ids::WidgetId;
use crate::domain::layout::Rect;
use crate::error::RenderAdapterError;
use hashlink::LinkedHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeState {
    rect: Rect,
    visible: bool,
}

/// Grid engine that tracks nodes in memory. Useful for tests and for running
/// the workspace without a browser; `set_available(false)` simulates an
/// engine whose state cannot be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessGrid {
    nodes: LinkedHashMap<WidgetId, NodeState>,
    editable: bool,
    available: bool,
}

impl Default for HeadlessGrid {
    fn default() -> Self {
        Self {
            nodes: LinkedHashMap::new(),
            editable: false,
            available: true,
        }
    }
}

impl HeadlessGrid {
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn rect(&self, id: &WidgetId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.rect)
    }

    pub fn is_visible(&self, id: &WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_mut(&mut self, id: &WidgetId, operation: &'static str) -> RenderResult<&mut NodeState> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| RenderAdapterError::new(operation, format!("no grid node for {id}")))
    }
}

impl GridEngine for HeadlessGrid {
    fn add_node(&mut self, id: &WidgetId, rect: Rect) -> RenderResult<()> {
        self.nodes.insert(id.clone(), NodeState { rect, visible: true });
        Ok(())
    }

    fn remove_node(&mut self, id: &WidgetId) -> RenderResult<()> {
        self.nodes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RenderAdapterError::new("remove_node", format!("no grid node for {id}")))
    }

    fn update_node(&mut self, id: &WidgetId, rect: Rect) -> RenderResult<()> {
        self.node_mut(id, "update_node")?.rect = rect;
        Ok(())
    }

    fn nodes(&self) -> RenderResult<Vec<GridNode>> {
        if !self.available {
            return Err(RenderAdapterError::new("nodes", "grid engine not available"));
        }
        Ok(self
            .nodes
            .iter()
            .map(|(id, n)| GridNode {
                id: id.clone(),
                rect: n.rect,
            })
            .collect())
    }

    fn set_visible(&mut self, id: &WidgetId, visible: bool) -> RenderResult<()> {
        self.node_mut(id, "set_visible")?.visible = visible;
        Ok(())
    }

    fn set_editable(&mut self, editable: bool) -> RenderResult<()> {
        self.editable = editable;
        Ok(())
    }

    fn remove_all(&mut self) -> RenderResult<()> {
        self.nodes.clear();
        Ok(())
    }
}
