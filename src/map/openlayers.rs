use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use js_sys::{Float64Array, Function, Uint32Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use super::engine::{ListenerKey, MapEngine, SketchHandle, TooltipHandle};
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::layers::{FeatureInfoParams, LayerRole, LayerSet};
use crate::measure::{SketchEvent, SketchGeometry, SketchKind};
use crate::types::{Coordinate, MapClick, Projection, ViewState};

#[wasm_bindgen(inline_js = r#"
function makeSource(ol, src) {
  switch (src.kind) {
    case 'osm':
      return new ol.source.OSM();
    case 'xyz':
      return new ol.source.XYZ({ url: src.url, attributions: src.attribution, crossOrigin: 'anonymous' });
    case 'wms':
      return new ol.source.TileWMS({
        url: src.url,
        params: { LAYERS: src.layers, TILED: src.tiled, VERSION: src.version },
        serverType: 'geoserver',
        transition: 0,
        crossOrigin: 'anonymous',
      });
  }
  throw new Error('unknown layer source ' + src.kind);
}

function defaultControls(ol) {
  const defaults = typeof ol.control.defaults === 'function'
    ? ol.control.defaults()
    : ol.control.defaults.defaults();
  return defaults.extend([new ol.control.ScaleLine(), new ol.control.FullScreen()]);
}

export function olCreateMap(target, lon, lat, zoom, layersJson, onTileError) {
  const ol = window.ol;
  if (!ol) {
    throw new Error('OpenLayers is not loaded');
  }
  const map = new ol.Map({
    target,
    controls: defaultControls(ol),
    view: new ol.View({ center: ol.proj.fromLonLat([lon, lat]), zoom }),
  });
  for (const d of JSON.parse(layersJson)) {
    const source = makeSource(ol, d.source);
    source.on('tileloaderror', () => onTileError(d.id));
    const layer = new ol.layer.Tile({ source, visible: d.visible });
    layer.set('id', d.id);
    layer.set('title', d.title);
    map.addLayer(layer);
  }
  return map;
}

export function olDispose(map) {
  map.setTarget(undefined);
}

export function olSetLayerVisible(map, id, visible) {
  const layer = findLayer(map, id);
  if (layer) {
    layer.setVisible(visible);
  }
}

export function olResolution(map) {
  const resolution = map.getView().getResolution();
  return resolution === undefined ? NaN : resolution;
}

function findLayer(map, id) {
  return map.getLayers().getArray().find((layer) => layer.get('id') === id);
}

export function olFeatureInfoUrl(map, id, x, y, resolution, infoFormat, featureCount) {
  const layer = findLayer(map, id);
  const source = layer && layer.getSource();
  if (!source || typeof source.getFeatureInfoUrl !== 'function') {
    return '';
  }
  const url = source.getFeatureInfoUrl([x, y], resolution, map.getView().getProjection(), {
    INFO_FORMAT: infoFormat,
    FEATURE_COUNT: featureCount,
  });
  return url || '';
}

export function olProjectionCode(map) {
  return map.getView().getProjection().getCode();
}

export function olOnSingleClick(map, handler) {
  return map.on('singleclick', (evt) => handler(evt.coordinate[0], evt.coordinate[1]));
}

export function olOnResolutionChange(map, handler) {
  return map.getView().on('change:resolution', () => handler(olResolution(map)));
}

export function olOnceRenderComplete(map, handler) {
  map.once('rendercomplete', () => handler());
}

export function olUnByKey(key) {
  window.ol.Observable.unByKey(key);
}

export function olCreatePopup(map, element) {
  const overlay = new window.ol.Overlay({
    element,
    positioning: 'bottom-center',
    stopEvent: true,
    offset: [0, -10],
  });
  map.addOverlay(overlay);
  return overlay;
}

export function olSetOverlayPosition(overlay, visible, x, y) {
  overlay.setPosition(visible ? [x, y] : undefined);
}

export function olBeginSketch(map, kind, handler) {
  const ol = window.ol;
  const source = new ol.source.Vector();
  const layer = new ol.layer.Vector({
    source,
    style: new ol.style.Style({
      fill: new ol.style.Fill({ color: 'rgba(255, 255, 255, 0.2)' }),
      stroke: new ol.style.Stroke({ color: '#ffcc33', width: 2 }),
      image: new ol.style.Circle({ radius: 7, fill: new ol.style.Fill({ color: '#ffcc33' }) }),
    }),
  });
  map.addLayer(layer);

  const draw = new ol.interaction.Draw({
    source,
    type: kind,
    style: new ol.style.Style({
      fill: new ol.style.Fill({ color: 'rgba(255, 255, 255, 0.2)' }),
      stroke: new ol.style.Stroke({ color: 'rgba(0, 0, 0, 0.5)', lineDash: [10, 10], width: 2 }),
      image: new ol.style.Circle({
        radius: 5,
        stroke: new ol.style.Stroke({ color: 'rgba(0, 0, 0, 0.7)' }),
        fill: new ol.style.Fill({ color: 'rgba(255, 255, 255, 0.2)' }),
      }),
    }),
  });
  map.addInteraction(draw);

  let listener = null;
  const empty = () => [new Float64Array(0), new Uint32Array(0), NaN, NaN];
  const projection = map.getView().getProjection();
  draw.on('drawstart', (evt) => {
    handler('start', kind, ...empty());
    listener = evt.feature.getGeometry().on('change', (e) => {
      const geom = e.target;
      const polygon = geom.getType() === 'Polygon';
      const lonLat = geom.clone().transform(projection, 'EPSG:4326');
      const flat = Float64Array.from(lonLat.getFlatCoordinates());
      const ends = Uint32Array.from(polygon ? lonLat.getEnds() : [flat.length]);
      const anchor = polygon ? geom.getInteriorPoint().getCoordinates() : geom.getLastCoordinate();
      handler('change', geom.getType(), flat, ends, anchor[0], anchor[1]);
    });
  });
  draw.on('drawend', () => {
    if (listener) {
      ol.Observable.unByKey(listener);
      listener = null;
    }
    handler('end', kind, ...empty());
  });
  return { draw, layer };
}

export function olEndSketch(map, sketch) {
  map.removeInteraction(sketch.draw);
  map.removeLayer(sketch.layer);
}

export function olCreateTooltip(map) {
  const element = document.createElement('div');
  element.className = 'tooltip tooltip-measure';
  const overlay = new window.ol.Overlay({
    element,
    offset: [0, -15],
    positioning: 'bottom-center',
    stopEvent: false,
  });
  map.addOverlay(overlay);
  return overlay;
}

export function olUpdateTooltip(overlay, text, x, y) {
  overlay.getElement().textContent = text;
  overlay.setPosition([x, y]);
}

export function olFreezeTooltip(overlay) {
  overlay.getElement().className = 'tooltip tooltip-static';
  overlay.setOffset([0, -7]);
}

export function olRemoveTooltip(map, overlay) {
  map.removeOverlay(overlay);
  const element = overlay.getElement();
  if (element && element.parentNode) {
    element.parentNode.removeChild(element);
  }
}

export function olSnapshot(map) {
  map.renderSync();
  const canvas = map.getViewport().querySelector('canvas');
  return canvas ? canvas.toDataURL('image/png') : '';
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = olCreateMap, catch)]
    fn ol_create_map(
        target: &HtmlElement,
        lon: f64,
        lat: f64,
        zoom: f64,
        layers_json: &str,
        on_tile_error: &Function,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = olDispose)]
    fn ol_dispose(map: &JsValue);

    #[wasm_bindgen(js_name = olSetLayerVisible)]
    fn ol_set_layer_visible(map: &JsValue, id: &str, visible: bool);

    #[wasm_bindgen(js_name = olResolution)]
    fn ol_resolution(map: &JsValue) -> f64;

    #[wasm_bindgen(js_name = olFeatureInfoUrl)]
    fn ol_feature_info_url(
        map: &JsValue,
        id: &str,
        x: f64,
        y: f64,
        resolution: f64,
        info_format: &str,
        feature_count: u32,
    ) -> String;

    #[wasm_bindgen(js_name = olProjectionCode)]
    fn ol_projection_code(map: &JsValue) -> String;

    #[wasm_bindgen(js_name = olOnSingleClick)]
    fn ol_on_single_click(map: &JsValue, handler: &Function) -> JsValue;

    #[wasm_bindgen(js_name = olOnResolutionChange)]
    fn ol_on_resolution_change(map: &JsValue, handler: &Function) -> JsValue;

    #[wasm_bindgen(js_name = olOnceRenderComplete)]
    fn ol_once_render_complete(map: &JsValue, handler: &JsValue);

    #[wasm_bindgen(js_name = olUnByKey)]
    fn ol_un_by_key(key: &JsValue);

    #[wasm_bindgen(js_name = olCreatePopup)]
    fn ol_create_popup(map: &JsValue, element: &HtmlElement) -> JsValue;

    #[wasm_bindgen(js_name = olSetOverlayPosition)]
    fn ol_set_overlay_position(overlay: &JsValue, visible: bool, x: f64, y: f64);

    #[wasm_bindgen(js_name = olBeginSketch)]
    fn ol_begin_sketch(map: &JsValue, kind: &str, handler: &Function) -> JsValue;

    #[wasm_bindgen(js_name = olEndSketch)]
    fn ol_end_sketch(map: &JsValue, sketch: &JsValue);

    #[wasm_bindgen(js_name = olCreateTooltip)]
    fn ol_create_tooltip(map: &JsValue) -> JsValue;

    #[wasm_bindgen(js_name = olUpdateTooltip)]
    fn ol_update_tooltip(overlay: &JsValue, text: &str, x: f64, y: f64);

    #[wasm_bindgen(js_name = olFreezeTooltip)]
    fn ol_freeze_tooltip(overlay: &JsValue);

    #[wasm_bindgen(js_name = olRemoveTooltip)]
    fn ol_remove_tooltip(map: &JsValue, overlay: &JsValue);

    #[wasm_bindgen(js_name = olSnapshot, catch)]
    fn ol_snapshot(map: &JsValue) -> std::result::Result<String, JsValue>;
}

type SketchCallback = Closure<dyn FnMut(String, String, Float64Array, Uint32Array, f64, f64)>;

/// An OpenLayers map living in a DOM element.
///
/// Rust closures handed to OpenLayers are owned here and dropped when their
/// listener or interaction is removed.
pub struct OlMap {
    map: JsValue,
    popup: RefCell<Option<JsValue>>,
    next_id: Cell<u32>,
    clicks: RefCell<HashMap<ListenerKey, (JsValue, Closure<dyn FnMut(f64, f64)>)>>,
    sketches: RefCell<HashMap<SketchHandle, (JsValue, SketchCallback)>>,
    tooltips: RefCell<HashMap<TooltipHandle, JsValue>>,
    view_listeners: RefCell<Vec<(JsValue, Closure<dyn FnMut(f64)>)>>,
    _tile_error: Closure<dyn FnMut(String)>,
}

impl OlMap {
    /// Create the map in `target` with every layer of `layers` added in z-order.
    pub fn new(target: &HtmlElement, config: &PortalConfig, layers: &LayerSet) -> Result<Self> {
        let [lon, lat] = config.default_center;
        let layers_json = serde_json::to_string(&layers.descriptors())?;

        let tile_error = Closure::<dyn FnMut(String)>::new(|id: String| {
            log::warn!("Tile failed to load for layer {id}");
        });

        let map = ol_create_map(
            target,
            lon,
            lat,
            config.default_zoom,
            &layers_json,
            tile_error.as_ref().unchecked_ref(),
        )
        .map_err(|e| PortalError::Config(format!("failed to create map: {e:?}")))?;

        log::info!("Map created with {} layers", layers.len());

        Ok(Self {
            map,
            popup: RefCell::new(None),
            next_id: Cell::new(1),
            clicks: RefCell::new(HashMap::new()),
            sketches: RefCell::new(HashMap::new()),
            tooltips: RefCell::new(HashMap::new()),
            view_listeners: RefCell::new(Vec::new()),
            _tile_error: tile_error,
        })
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Attach the identify popup element as an overlay.
    pub fn bind_popup(&self, element: &HtmlElement) {
        *self.popup.borrow_mut() = Some(ol_create_popup(&self.map, element));
    }

    pub fn once_render_complete(&self, handler: impl FnOnce() + 'static) {
        ol_once_render_complete(&self.map, &Closure::once_into_js(handler));
    }

    /// Call `handler` with the new resolution whenever the view zooms.
    pub fn on_resolution_change(&self, handler: impl FnMut(f64) + 'static) {
        let closure = Closure::<dyn FnMut(f64)>::new(handler);
        let key = ol_on_resolution_change(&self.map, closure.as_ref().unchecked_ref());
        self.view_listeners.borrow_mut().push((key, closure));
    }
}

impl Drop for OlMap {
    fn drop(&mut self) {
        for (_, (js_key, _closure)) in self.clicks.get_mut().drain() {
            ol_un_by_key(&js_key);
        }
        for (js_key, _closure) in self.view_listeners.get_mut().drain(..) {
            ol_un_by_key(&js_key);
        }
        ol_dispose(&self.map);
    }
}

impl MapEngine for OlMap {
    fn set_layer_visible(&self, role: LayerRole, visible: bool) {
        ol_set_layer_visible(&self.map, role.id(), visible);
    }

    fn view_state(&self) -> ViewState {
        view_state_of(&self.map)
    }

    fn listen_single_click(&self, mut handler: Box<dyn FnMut(MapClick)>) -> ListenerKey {
        let map = self.map.clone();
        let closure = Closure::<dyn FnMut(f64, f64)>::new(move |x: f64, y: f64| {
            handler(MapClick {
                coordinate: Coordinate::new(x, y),
                view: view_state_of(&map),
            });
        });
        let js_key = ol_on_single_click(&self.map, closure.as_ref().unchecked_ref());
        let key = ListenerKey(self.next_id());
        self.clicks.borrow_mut().insert(key, (js_key, closure));
        key
    }

    fn feature_info_url(
        &self,
        role: LayerRole,
        click: &MapClick,
        params: &FeatureInfoParams,
    ) -> Option<String> {
        let url = ol_feature_info_url(
            &self.map,
            role.id(),
            click.coordinate.x,
            click.coordinate.y,
            click.view.resolution,
            &params.info_format,
            params.feature_count,
        );
        (!url.is_empty()).then_some(url)
    }

    fn unlisten(&self, key: ListenerKey) {
        if let Some((js_key, _closure)) = self.clicks.borrow_mut().remove(&key) {
            ol_un_by_key(&js_key);
        }
    }

    fn set_popup_position(&self, position: Option<Coordinate>) {
        let Some(popup) = self.popup.borrow().clone() else {
            log::warn!("Popup overlay is not bound");
            return;
        };
        match position {
            Some(c) => ol_set_overlay_position(&popup, true, c.x, c.y),
            None => ol_set_overlay_position(&popup, false, 0.0, 0.0),
        }
    }

    fn begin_sketch(
        &self,
        kind: SketchKind,
        mut handler: Box<dyn FnMut(SketchEvent)>,
    ) -> SketchHandle {
        let closure: SketchCallback = Closure::new(
            move |event: String, geometry: String, flat: Float64Array, ends: Uint32Array, x: f64, y: f64| {
                let anchor = Coordinate::new(x, y);
                match decode_sketch_event(&event, &geometry, &flat.to_vec(), &ends.to_vec(), anchor) {
                    Some(event) => handler(event),
                    None => log::warn!("Ignoring sketch event {event} ({geometry})"),
                }
            },
        );
        let sketch = ol_begin_sketch(&self.map, kind.as_str(), closure.as_ref().unchecked_ref());
        let handle = SketchHandle(self.next_id());
        self.sketches.borrow_mut().insert(handle, (sketch, closure));
        handle
    }

    fn end_sketch(&self, handle: SketchHandle) {
        if let Some((sketch, _closure)) = self.sketches.borrow_mut().remove(&handle) {
            ol_end_sketch(&self.map, &sketch);
        }
    }

    fn create_tooltip(&self) -> TooltipHandle {
        let handle = TooltipHandle(self.next_id());
        let overlay = ol_create_tooltip(&self.map);
        self.tooltips.borrow_mut().insert(handle, overlay);
        handle
    }

    fn update_tooltip(&self, tooltip: TooltipHandle, text: &str, position: Coordinate) {
        if let Some(overlay) = self.tooltips.borrow().get(&tooltip) {
            ol_update_tooltip(overlay, text, position.x, position.y);
        }
    }

    fn freeze_tooltip(&self, tooltip: TooltipHandle) {
        if let Some(overlay) = self.tooltips.borrow().get(&tooltip) {
            ol_freeze_tooltip(overlay);
        }
    }

    fn remove_tooltip(&self, tooltip: TooltipHandle) {
        if let Some(overlay) = self.tooltips.borrow_mut().remove(&tooltip) {
            ol_remove_tooltip(&self.map, &overlay);
        }
    }

    fn snapshot_png(&self) -> Option<String> {
        match ol_snapshot(&self.map) {
            Ok(url) if !url.is_empty() => Some(url),
            Ok(_) => {
                log::error!("Map canvas not found");
                None
            }
            Err(e) => {
                log::error!("Failed to capture map: {e:?}");
                None
            }
        }
    }
}

fn view_state_of(map: &JsValue) -> ViewState {
    let code = ol_projection_code(map);
    let projection = Projection::from_code(&code).unwrap_or_else(|| {
        log::warn!("Unsupported view projection {code}, assuming EPSG:3857");
        Projection::WebMercator
    });
    ViewState {
        resolution: ol_resolution(map),
        projection,
    }
}

/// Turn the bridge's draw callback arguments into a [`SketchEvent`].
///
/// `flat` holds lon/lat pairs; `ends` holds the flat offset where each ring
/// ends. `anchor` is in map coordinates and only read for changes.
fn decode_sketch_event(
    event: &str,
    geometry: &str,
    flat: &[f64],
    ends: &[u32],
    anchor: Coordinate,
) -> Option<SketchEvent> {
    match event {
        "start" => Some(SketchEvent::Start),
        "end" => Some(SketchEvent::End),
        "change" => {
            let mut rings = Vec::with_capacity(ends.len());
            let mut offset = 0;
            for &end in ends {
                let end = (end as usize).min(flat.len());
                let ring: Vec<Coordinate> = flat[offset.min(end)..end]
                    .chunks_exact(2)
                    .map(|xy| Coordinate::new(xy[0], xy[1]))
                    .collect();
                rings.push(ring);
                offset = end;
            }
            if !(anchor.x.is_finite() && anchor.y.is_finite()) {
                return None;
            }
            let geometry = match geometry {
                "LineString" => SketchGeometry::LineString(rings.into_iter().next()?),
                "Polygon" => SketchGeometry::Polygon(rings),
                _ => return None,
            };
            Some(SketchEvent::Change { geometry, anchor })
        }
        _ => None,
    }
}
