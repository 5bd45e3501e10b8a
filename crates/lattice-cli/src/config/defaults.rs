use latticert::engine::config::PackingMode;

pub struct DefaultsConfig {
    pub diameter_mm: f64,
    pub spacing_mm: f64,
    pub margin_mm: f64,
    pub packing: PackingMode,
    pub output_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            diameter_mm: 15.0,
            spacing_mm: 60.0,
            margin_mm: 7.5,
            packing: PackingMode::Cubic,
            output_name: "Lattice_GTV".to_string(),
        }
    }
}
