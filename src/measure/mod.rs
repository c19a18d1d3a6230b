//! Distance measurement on the map.
//!
//! While the tool is active a draw interaction runs on a scratch layer and a
//! tooltip follows the sketch. Finished sketches leave a static label behind;
//! deactivating the tool removes the interaction and every label.

pub mod sphere;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::map::{MapEngine, SketchHandle, TooltipHandle};
use crate::types::Coordinate;

use sphere::{format_area, format_length, line_length, polygon_area};

/// Geometry type of the draw interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchKind {
    LineString,
    Polygon,
}

impl SketchKind {
    /// OpenLayers geometry type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SketchKind::LineString => "LineString",
            SketchKind::Polygon => "Polygon",
        }
    }
}

/// The geometry being drawn, in `(lon, lat)` degrees.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchGeometry {
    LineString(Vec<Coordinate>),
    /// Outer ring first.
    Polygon(Vec<Vec<Coordinate>>),
}

impl SketchGeometry {
    /// Formatted length or area on the sphere.
    pub fn measurement(&self) -> String {
        match self {
            SketchGeometry::LineString(coords) => format_length(line_length(coords)),
            SketchGeometry::Polygon(rings) => format_area(polygon_area(rings)),
        }
    }
}

/// Draw interaction events.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchEvent {
    Start,
    /// `anchor` is where the tooltip goes, in map coordinates: the last
    /// vertex of a line or the interior point of a polygon.
    Change {
        geometry: SketchGeometry,
        anchor: Coordinate,
    },
    End,
}

/// One activation of the tool.
struct MeasureSession {
    engine: Rc<dyn MapEngine>,
    sketch: Option<SketchHandle>,
    live: Option<TooltipHandle>,
    frozen: Vec<TooltipHandle>,
    drawing: bool,
}

impl MeasureSession {
    fn handle(&mut self, event: SketchEvent) {
        match event {
            SketchEvent::Start => self.drawing = true,
            SketchEvent::Change { geometry, anchor } => {
                if !self.drawing {
                    return;
                }
                if let Some(tooltip) = self.live {
                    self.engine
                        .update_tooltip(tooltip, &geometry.measurement(), anchor);
                }
            }
            SketchEvent::End => {
                self.drawing = false;
                if let Some(tooltip) = self.live.take() {
                    self.engine.freeze_tooltip(tooltip);
                    self.frozen.push(tooltip);
                }
                self.live = Some(self.engine.create_tooltip());
            }
        }
    }

    fn close(&mut self) {
        if let Some(sketch) = self.sketch.take() {
            self.engine.end_sketch(sketch);
        }
        for tooltip in self.live.take().into_iter().chain(self.frozen.drain(..)) {
            self.engine.remove_tooltip(tooltip);
        }
        self.drawing = false;
    }
}

/// Toolbar state of the measure button.
#[derive(Default)]
pub struct MeasureTool {
    session: Option<Rc<RefCell<MeasureSession>>>,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Flip the tool. Returns whether it is now active.
    pub fn toggle(&mut self, engine: Rc<dyn MapEngine>) -> bool {
        match self.session.take() {
            Some(session) => {
                session.borrow_mut().close();
                log::debug!("Measure tool deactivated");
                false
            }
            None => {
                self.session = Some(Self::open(engine, SketchKind::LineString));
                log::debug!("Measure tool activated");
                true
            }
        }
    }

    fn open(engine: Rc<dyn MapEngine>, kind: SketchKind) -> Rc<RefCell<MeasureSession>> {
        let live = engine.create_tooltip();
        let session = Rc::new(RefCell::new(MeasureSession {
            engine: engine.clone(),
            sketch: None,
            live: Some(live),
            frozen: Vec::new(),
            drawing: false,
        }));

        let weak: Weak<RefCell<MeasureSession>> = Rc::downgrade(&session);
        let sketch = engine.begin_sketch(
            kind,
            Box::new(move |event| {
                if let Some(session) = weak.upgrade() {
                    session.borrow_mut().handle(event);
                }
            }),
        );
        session.borrow_mut().sketch = Some(sketch);
        session
    }
}

impl Drop for MeasureTool {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.borrow_mut().close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fake::FakeEngine;

    /// A northward line of `meters` with its tooltip anchor.
    fn line(meters: f64) -> SketchEvent {
        let start = Coordinate::new(60.6122, 55.1544);
        let end = Coordinate::new(start.x, start.y + (meters / sphere::EARTH_RADIUS).to_degrees());
        SketchEvent::Change {
            geometry: SketchGeometry::LineString(vec![start, end]),
            anchor: Coordinate::new(6_747_000.0, 7_385_000.0 + meters),
        }
    }

    fn engine() -> (Rc<FakeEngine>, Rc<dyn MapEngine>) {
        let fake = Rc::new(FakeEngine::new());
        let shared: Rc<dyn MapEngine> = fake.clone();
        (fake, shared)
    }

    #[test]
    fn test_activation_adds_line_sketch_and_tooltip() {
        let (fake, shared) = engine();
        let mut tool = MeasureTool::new();
        assert!(tool.toggle(shared));
        assert!(tool.is_active());
        assert_eq!(fake.sketch_count(), 1);
        assert_eq!(fake.sketch_kind(), Some(SketchKind::LineString));
        assert_eq!(fake.tooltip_count(), 1);
    }

    #[test]
    fn test_live_tooltip_follows_sketch() {
        let (fake, shared) = engine();
        let mut tool = MeasureTool::new();
        tool.toggle(shared);

        // changes before drawstart are ignored
        fake.sketch(line(500.0));
        assert_eq!(fake.live_tooltip().unwrap().text, "");

        fake.sketch(SketchEvent::Start);
        fake.sketch(line(500.0));
        assert_eq!(fake.live_tooltip().unwrap().text, "500 m");

        fake.sketch(line(1500.0));
        let live = fake.live_tooltip().unwrap();
        assert_eq!(live.text, "1.5 km");
        assert_eq!(live.position, Some(Coordinate::new(6_747_000.0, 7_386_500.0)));
    }

    #[test]
    fn test_drawend_freezes_and_starts_new_tooltip() {
        let (fake, shared) = engine();
        let mut tool = MeasureTool::new();
        tool.toggle(shared);

        for meters in [500.0, 1500.0] {
            fake.sketch(SketchEvent::Start);
            fake.sketch(line(meters));
            fake.sketch(SketchEvent::End);
        }

        let frozen: Vec<String> = fake.frozen_tooltips().into_iter().map(|t| t.text).collect();
        assert_eq!(frozen, vec!["500 m".to_string(), "1.5 km".to_string()]);
        assert_eq!(fake.live_tooltip().unwrap().text, "");
        assert_eq!(fake.tooltip_count(), 3);
    }

    #[test]
    fn test_deactivation_removes_every_overlay() {
        let (fake, shared) = engine();
        let mut tool = MeasureTool::new();
        tool.toggle(shared.clone());
        fake.sketch(SketchEvent::Start);
        fake.sketch(line(500.0));
        fake.sketch(SketchEvent::End);
        fake.sketch(SketchEvent::Start);
        fake.sketch(line(700.0));

        assert!(!tool.toggle(shared));
        assert!(!tool.is_active());
        assert_eq!(fake.sketch_count(), 0);
        assert_eq!(fake.tooltip_count(), 0);
    }

    #[test]
    fn test_polygon_measurement_in_square_km() {
        let ring: Vec<Coordinate> = [(60.0, 55.0), (60.01, 55.0), (60.01, 55.01), (60.0, 55.01), (60.0, 55.0)]
            .into_iter()
            .map(|(lon, lat)| Coordinate::new(lon, lat))
            .collect();
        // about 0.71 km² at this latitude
        assert_eq!(SketchGeometry::Polygon(vec![ring]).measurement(), "0.71 km²");
    }
}
