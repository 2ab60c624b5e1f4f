//! Collapsible sidebar with the filter menu.
//!
//! Pure presentation state: two independent flags, each flipped only by its
//! own button. The filter checkboxes are rendered but deliberately drive
//! nothing.

/// A single filter checkbox.
#[derive(Debug, Clone)]
pub struct FilterOption {
    /// Checkbox label.
    pub label: &'static str,
    /// Whether the checkbox is ticked.
    pub checked: bool,
}

/// Visibility state of the sidebar and its filter menu.
#[derive(Debug, Clone)]
pub struct SidebarState {
    open: bool,
    filter_menu_open: bool,
    filters: Vec<FilterOption>,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self {
            open: false,
            filter_menu_open: false,
            filters: ["Ports", "Beaches", "Nature reserves", "Coral reefs"]
                .iter()
                .map(|&label| FilterOption {
                    label,
                    checked: false,
                })
                .collect(),
        }
    }
}

impl SidebarState {
    /// Whether the sidebar is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the filter menu inside the sidebar is open.
    pub fn is_filter_menu_open(&self) -> bool {
        self.filter_menu_open
    }

    /// Flips the sidebar open/closed.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Flips the filter menu open/closed.
    pub fn toggle_filter_menu(&mut self) {
        self.filter_menu_open = !self.filter_menu_open;
    }

    /// The filter options.
    pub fn filters(&self) -> &[FilterOption] {
        &self.filters
    }

    /// Renders the sidebar toggle button and, when open, the panel itself.
    pub fn show(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(180.0)
            .show_animated(ctx, self.open, |ui| {
                ui.add_space(30.0);
                ui.heading("Tanamap");
                ui.separator();

                if ui.button("Filter").clicked() {
                    self.toggle_filter_menu();
                }
                if self.filter_menu_open {
                    ui.indent("filter-menu", |ui| {
                        for filter in &mut self.filters {
                            ui.checkbox(&mut filter.checked, filter.label);
                        }
                    });
                }
            });

        egui::Window::new("sidebar-toggle")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .show(ctx, |ui| {
                let label = if self.open { "✕" } else { "☰" };
                if ui.button(label).clicked() {
                    self.toggle();
                }
            });
    }
}
