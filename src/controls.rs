use std::collections::BTreeMap;

use crate::layers::{Basemap, LayerGroup, LayerKind, LayerRole, LayerSet};

/// State of one sidebar checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckboxState {
    pub checked: bool,
    pub disabled: bool,
}

/// Sidebar controls bound to layer visibility.
///
/// Every mutation goes through a method that also updates the [`LayerSet`],
/// so the checkbox state and layer visibility cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    checkboxes: BTreeMap<LayerRole, CheckboxState>,
    disabled_groups: BTreeMap<LayerGroup, bool>,
    basemap: Basemap,
    boundary_option_disabled: bool,
    natural_auto_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        let checkboxes = LayerRole::ALL
            .into_iter()
            .filter(|role| role.kind() != LayerKind::Base)
            .map(|role| (role, CheckboxState::default()))
            .collect();
        let disabled_groups = LayerGroup::CONTROLLED
            .into_iter()
            .map(|group| (group, false))
            .collect();

        Self {
            checkboxes,
            disabled_groups,
            basemap: Basemap::default(),
            boundary_option_disabled: false,
            natural_auto_enabled: false,
        }
    }

    /// Copy current layer visibility into the checkboxes.
    pub fn bind(&mut self, layers: &LayerSet) {
        for (role, state) in self.checkboxes.iter_mut() {
            state.checked = layers.is_visible(*role);
        }
        self.basemap = self.active_basemap(layers);
    }

    pub fn checkbox(&self, role: LayerRole) -> Option<CheckboxState> {
        self.checkboxes.get(&role).copied()
    }

    pub fn is_group_disabled(&self, group: LayerGroup) -> bool {
        self.disabled_groups.get(&group).copied().unwrap_or(false)
    }

    pub fn basemap(&self) -> Basemap {
        self.basemap
    }

    pub fn is_boundary_option_disabled(&self) -> bool {
        self.boundary_option_disabled
    }

    /// Checkbox change handler. A disabled checkbox stays unchecked.
    pub fn toggle(&mut self, role: LayerRole, checked: bool, layers: &mut LayerSet) {
        let Some(state) = self.checkboxes.get_mut(&role) else {
            log::warn!("No checkbox bound to layer {}", role.id());
            return;
        };
        state.checked = checked && !state.disabled;
        self.apply(role, layers);
    }

    /// Push a checkbox's state to its layer. A disabled checkbox always hides it.
    fn apply(&self, role: LayerRole, layers: &mut LayerSet) {
        if let Some(state) = self.checkboxes.get(&role) {
            layers.set_visible(role, state.checked && !state.disabled);
        }
    }

    fn sync_group_checkboxes(&mut self, group: LayerGroup, layers: &LayerSet) {
        for role in LayerRole::roles_in(group) {
            if let Some(state) = self.checkboxes.get_mut(&role) {
                state.checked = layers.is_visible(role);
            }
        }
    }

    /// Basemap selector change handler.
    pub fn select_basemap(&mut self, basemap: Basemap, layers: &mut LayerSet) {
        layers.set_group_visible(LayerGroup::Base, false);

        if self.natural_auto_enabled && basemap != Basemap::Boundary {
            layers.set_group_visible(LayerGroup::Natural, false);
            self.natural_auto_enabled = false;
            self.sync_group_checkboxes(LayerGroup::Natural, layers);
        }

        let basemap = if basemap == Basemap::Boundary && self.boundary_option_disabled {
            log::debug!("Boundary basemap is not available, falling back to OSM");
            Basemap::Osm
        } else {
            basemap
        };

        match basemap.layer() {
            Some(role) => {
                layers.set_visible(role, true);
            }
            None => {
                layers.set_group_visible(LayerGroup::Natural, true);
                self.natural_auto_enabled = true;
                self.sync_group_checkboxes(LayerGroup::Natural, layers);
            }
        }
        self.basemap = basemap;
    }

    /// Which basemap the layer state corresponds to. Exactly one is reported.
    pub fn active_basemap(&self, layers: &LayerSet) -> Basemap {
        Basemap::ALL
            .into_iter()
            .find(|b| b.layer().is_some_and(|role| layers.is_visible(role)))
            .unwrap_or(Basemap::Boundary)
    }

    /// Enable or lock every layer group depending on authorization.
    ///
    /// Locked checkboxes are unchecked and their layers hidden directly.
    pub fn apply_access(&mut self, authorized: bool, layers: &mut LayerSet) {
        for disabled in self.disabled_groups.values_mut() {
            *disabled = !authorized;
        }

        let roles: Vec<LayerRole> = self.checkboxes.keys().copied().collect();
        for role in roles {
            if let Some(state) = self.checkboxes.get_mut(&role) {
                state.disabled = !authorized;
                if !authorized {
                    state.checked = false;
                }
            }
            self.apply(role, layers);
        }

        self.boundary_option_disabled = !authorized;
        if !authorized {
            // natural layers were hidden with their checkboxes above
            self.natural_auto_enabled = false;
            self.select_basemap(Basemap::Osm, layers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;

    fn setup() -> (ControlPanel, LayerSet) {
        let layers = LayerSet::from_config(&PortalConfig::default());
        let mut panel = ControlPanel::new();
        panel.bind(&layers);
        (panel, layers)
    }

    #[test]
    fn test_bind_copies_visibility() {
        let mut layers = LayerSet::from_config(&PortalConfig::default());
        layers.set_visible(LayerRole::Mines, true);
        let mut panel = ControlPanel::new();
        panel.bind(&layers);
        assert!(panel.checkbox(LayerRole::Mines).unwrap().checked);
        assert!(!panel.checkbox(LayerRole::Kilns).unwrap().checked);
        assert!(panel.checkbox(LayerRole::Osm).is_none());
    }

    #[test]
    fn test_toggle_only_changes_its_layer() {
        for role in LayerRole::ALL.into_iter().filter(|r| r.kind() != LayerKind::Base) {
            let (mut panel, mut layers) = setup();
            let before = layers.visibility();
            panel.toggle(role, true, &mut layers);
            for ((r, was), (_, now)) in before.iter().zip(layers.visibility()) {
                if *r == role {
                    assert!(now, "{} should be visible", r.id());
                } else {
                    assert_eq!(*was, now, "{} changed unexpectedly", r.id());
                }
            }
            panel.toggle(role, false, &mut layers);
            assert!(!layers.is_visible(role));
        }
    }

    #[test]
    fn test_disabled_checkbox_forces_invisible() {
        let (mut panel, mut layers) = setup();
        panel.apply_access(false, &mut layers);
        panel.toggle(LayerRole::Railway, true, &mut layers);
        assert!(!layers.is_visible(LayerRole::Railway));
        assert!(!panel.checkbox(LayerRole::Railway).unwrap().checked);
    }

    #[test]
    fn test_checkbox_matches_layer_after_unlock() {
        let (mut panel, mut layers) = setup();
        panel.apply_access(false, &mut layers);
        panel.toggle(LayerRole::Railway, true, &mut layers);
        panel.apply_access(true, &mut layers);

        for role in LayerRole::ALL.into_iter().filter(|r| r.kind() != LayerKind::Base) {
            let state = panel.checkbox(role).unwrap();
            assert!(!state.disabled);
            assert_eq!(state.checked, layers.is_visible(role), "{} drifted", role.id());
        }

        panel.toggle(LayerRole::Railway, true, &mut layers);
        assert!(layers.is_visible(LayerRole::Railway));
    }

    #[test]
    fn test_basemap_selection_is_exclusive() {
        let (mut panel, mut layers) = setup();
        for basemap in Basemap::ALL {
            panel.select_basemap(basemap, &mut layers);
            let tiles_visible = LayerRole::roles_in(LayerGroup::Base)
                .filter(|r| layers.is_visible(*r))
                .count();
            let expected = if basemap == Basemap::Boundary { 0 } else { 1 };
            assert_eq!(tiles_visible, expected);
            assert_eq!(panel.active_basemap(&layers), basemap);
            assert_eq!(panel.basemap(), basemap);
        }
    }

    #[test]
    fn test_boundary_basemap_enables_natural_layers() {
        let (mut panel, mut layers) = setup();
        panel.select_basemap(Basemap::Boundary, &mut layers);
        for role in LayerRole::roles_in(LayerGroup::Natural) {
            assert!(layers.is_visible(role));
            assert!(panel.checkbox(role).unwrap().checked);
        }

        panel.select_basemap(Basemap::Topo, &mut layers);
        for role in LayerRole::roles_in(LayerGroup::Natural) {
            assert!(!layers.is_visible(role));
            assert!(!panel.checkbox(role).unwrap().checked);
        }
        assert!(layers.is_visible(LayerRole::Topo));
    }

    #[test]
    fn test_disabled_boundary_option_falls_back_to_osm() {
        let (mut panel, mut layers) = setup();
        panel.apply_access(false, &mut layers);
        panel.select_basemap(Basemap::Satellite, &mut layers);
        panel.select_basemap(Basemap::Boundary, &mut layers);
        assert_eq!(panel.basemap(), Basemap::Osm);
        assert!(layers.is_visible(LayerRole::Osm));
        assert!(!layers.is_visible(LayerRole::Satellite));
        assert!(!layers.is_visible(LayerRole::Vegetation));
    }

    #[test]
    fn test_unauthorized_access_locks_everything() {
        let (mut panel, mut layers) = setup();
        panel.toggle(LayerRole::Railway, true, &mut layers);
        panel.toggle(LayerRole::Boundary, true, &mut layers);
        panel.select_basemap(Basemap::Boundary, &mut layers);

        panel.apply_access(false, &mut layers);

        for group in LayerGroup::CONTROLLED {
            assert!(panel.is_group_disabled(group));
            for role in LayerRole::roles_in(group) {
                let state = panel.checkbox(role).unwrap();
                assert!(state.disabled && !state.checked);
                assert!(!layers.is_visible(role));
            }
        }
        assert!(panel.is_boundary_option_disabled());
        assert_eq!(panel.basemap(), Basemap::Osm);
        assert!(layers.is_visible(LayerRole::Osm));
    }

    #[test]
    fn test_authorized_access_unlocks_without_checking() {
        let (mut panel, mut layers) = setup();
        panel.apply_access(false, &mut layers);
        panel.apply_access(true, &mut layers);

        for group in LayerGroup::CONTROLLED {
            assert!(!panel.is_group_disabled(group));
        }
        let state = panel.checkbox(LayerRole::Railway).unwrap();
        assert!(!state.disabled && !state.checked);
        assert!(!panel.is_boundary_option_disabled());

        panel.toggle(LayerRole::Railway, true, &mut layers);
        assert!(layers.is_visible(LayerRole::Railway));
        assert!(layers.is_visible(LayerRole::Osm));
    }
}
