use crate::layers::{FeatureInfoParams, LayerRole};
use crate::measure::{SketchEvent, SketchKind};
use crate::types::{Coordinate, MapClick, ViewState};

/// Key of a registered single-click listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey(pub u32);

/// A running draw interaction together with its scratch vector layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SketchHandle(pub u32);

/// A measurement tooltip overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TooltipHandle(pub u32);

/// Everything the portal asks of the map library.
///
/// All methods take `&self`; implementations use interior mutability so the
/// engine can be shared as `Rc<dyn MapEngine>` by the tools and handlers
/// may call back into it while being dispatched.
pub trait MapEngine {
    fn set_layer_visible(&self, role: LayerRole, visible: bool);

    /// Current resolution and projection of the view.
    fn view_state(&self) -> ViewState;

    /// GetFeatureInfo URL of a WMS layer for a click, built by the layer's
    /// source. `None` when the layer has no such source or the click falls
    /// outside its tile grid.
    fn feature_info_url(
        &self,
        role: LayerRole,
        click: &MapClick,
        params: &FeatureInfoParams,
    ) -> Option<String>;

    fn listen_single_click(&self, handler: Box<dyn FnMut(MapClick)>) -> ListenerKey;

    fn unlisten(&self, key: ListenerKey);

    /// Move the identify popup; `None` hides it.
    fn set_popup_position(&self, position: Option<Coordinate>);

    /// Add a draw interaction with its own scratch layer.
    fn begin_sketch(&self, kind: SketchKind, handler: Box<dyn FnMut(SketchEvent)>)
        -> SketchHandle;

    /// Remove the draw interaction and its scratch layer.
    fn end_sketch(&self, handle: SketchHandle);

    /// A new live tooltip (`tooltip tooltip-measure`, offset `[0, -15]`).
    fn create_tooltip(&self) -> TooltipHandle;

    fn update_tooltip(&self, tooltip: TooltipHandle, text: &str, position: Coordinate);

    /// Turn a live tooltip into a static label (`tooltip tooltip-static`, offset `[0, -7]`).
    fn freeze_tooltip(&self, tooltip: TooltipHandle);

    fn remove_tooltip(&self, tooltip: TooltipHandle);

    /// The rendered map as a `data:image/png` URL.
    fn snapshot_png(&self) -> Option<String>;
}

#[cfg(test)]
pub mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::types::Projection;

    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeTooltip {
        pub text: String,
        pub position: Option<Coordinate>,
        pub frozen: bool,
    }

    /// In-memory engine that records what the tools did to it.
    pub struct FakeEngine {
        next_id: Cell<u32>,
        pub view: Cell<ViewState>,
        pub visible: RefCell<BTreeMap<LayerRole, bool>>,
        pub popup: Cell<Option<Coordinate>>,
        /// Layers whose source cannot build a feature-info URL.
        pub no_feature_info: RefCell<BTreeSet<LayerRole>>,
        clicks: RefCell<BTreeMap<ListenerKey, Box<dyn FnMut(MapClick)>>>,
        sketches: RefCell<BTreeMap<SketchHandle, (SketchKind, Box<dyn FnMut(SketchEvent)>)>>,
        pub tooltips: RefCell<BTreeMap<TooltipHandle, FakeTooltip>>,
    }

    impl FakeEngine {
        pub fn new() -> Self {
            Self {
                next_id: Cell::new(1),
                view: Cell::new(ViewState {
                    resolution: 305.748_113_140_705_4,
                    projection: Projection::WebMercator,
                }),
                visible: RefCell::new(BTreeMap::new()),
                popup: Cell::new(None),
                no_feature_info: RefCell::new(BTreeSet::new()),
                clicks: RefCell::new(BTreeMap::new()),
                sketches: RefCell::new(BTreeMap::new()),
                tooltips: RefCell::new(BTreeMap::new()),
            }
        }

        fn next(&self) -> u32 {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            id
        }

        pub fn listener_count(&self) -> usize {
            self.clicks.borrow().len()
        }

        pub fn sketch_count(&self) -> usize {
            self.sketches.borrow().len()
        }

        pub fn sketch_kind(&self) -> Option<SketchKind> {
            self.sketches.borrow().values().next().map(|(kind, _)| *kind)
        }

        pub fn tooltip_count(&self) -> usize {
            self.tooltips.borrow().len()
        }

        pub fn frozen_tooltips(&self) -> Vec<FakeTooltip> {
            self.tooltips
                .borrow()
                .values()
                .filter(|t| t.frozen)
                .cloned()
                .collect()
        }

        pub fn live_tooltip(&self) -> Option<FakeTooltip> {
            self.tooltips.borrow().values().find(|t| !t.frozen).cloned()
        }

        /// Deliver a click to every listener.
        pub fn click(&self, coordinate: Coordinate) {
            let click = MapClick {
                coordinate,
                view: self.view.get(),
            };
            let keys: Vec<ListenerKey> = self.clicks.borrow().keys().copied().collect();
            for key in keys {
                // handlers may unlisten while running, so take them out first
                let handler = self.clicks.borrow_mut().remove(&key);
                if let Some(mut handler) = handler {
                    handler(click);
                    self.clicks.borrow_mut().insert(key, handler);
                }
            }
        }

        /// Deliver a draw event to every running sketch.
        pub fn sketch(&self, event: SketchEvent) {
            let handles: Vec<SketchHandle> = self.sketches.borrow().keys().copied().collect();
            for handle in handles {
                let entry = self.sketches.borrow_mut().remove(&handle);
                if let Some((kind, mut handler)) = entry {
                    handler(event.clone());
                    self.sketches.borrow_mut().insert(handle, (kind, handler));
                }
            }
        }
    }

    impl MapEngine for FakeEngine {
        fn set_layer_visible(&self, role: LayerRole, visible: bool) {
            self.visible.borrow_mut().insert(role, visible);
        }

        fn view_state(&self) -> ViewState {
            self.view.get()
        }

        fn feature_info_url(
            &self,
            role: LayerRole,
            click: &MapClick,
            params: &FeatureInfoParams,
        ) -> Option<String> {
            if self.no_feature_info.borrow().contains(&role) {
                return None;
            }
            Some(format!(
                "/geoserver/wms?REQUEST=GetFeatureInfo&LAYERS={}&INFO_FORMAT={}&FEATURE_COUNT={}&X={}&Y={}",
                role.id(),
                params.info_format,
                params.feature_count,
                click.coordinate.x,
                click.coordinate.y
            ))
        }

        fn listen_single_click(&self, handler: Box<dyn FnMut(MapClick)>) -> ListenerKey {
            let key = ListenerKey(self.next());
            self.clicks.borrow_mut().insert(key, handler);
            key
        }

        fn unlisten(&self, key: ListenerKey) {
            self.clicks.borrow_mut().remove(&key);
        }

        fn set_popup_position(&self, position: Option<Coordinate>) {
            self.popup.set(position);
        }

        fn begin_sketch(
            &self,
            kind: SketchKind,
            handler: Box<dyn FnMut(SketchEvent)>,
        ) -> SketchHandle {
            let handle = SketchHandle(self.next());
            self.sketches.borrow_mut().insert(handle, (kind, handler));
            handle
        }

        fn end_sketch(&self, handle: SketchHandle) {
            self.sketches.borrow_mut().remove(&handle);
        }

        fn create_tooltip(&self) -> TooltipHandle {
            let handle = TooltipHandle(self.next());
            self.tooltips.borrow_mut().insert(
                handle,
                FakeTooltip {
                    text: String::new(),
                    position: None,
                    frozen: false,
                },
            );
            handle
        }

        fn update_tooltip(&self, tooltip: TooltipHandle, text: &str, position: Coordinate) {
            if let Some(t) = self.tooltips.borrow_mut().get_mut(&tooltip) {
                t.text = text.to_string();
                t.position = Some(position);
            }
        }

        fn freeze_tooltip(&self, tooltip: TooltipHandle) {
            if let Some(t) = self.tooltips.borrow_mut().get_mut(&tooltip) {
                t.frozen = true;
            }
        }

        fn remove_tooltip(&self, tooltip: TooltipHandle) {
            self.tooltips.borrow_mut().remove(&tooltip);
        }

        fn snapshot_png(&self) -> Option<String> {
            Some("data:image/png;base64,AAAA".to_string())
        }
    }
}
