/// Inches per metre.
const INCHES_PER_METER: f64 = 39.37;
/// Screen pixels per inch for the OGC standardized 0.28 mm pixel.
const DOTS_PER_INCH: f64 = 25.4 / 0.28;

/// Scale denominator of the view.
pub fn map_scale(resolution: f64, meters_per_unit: f64) -> u64 {
    (resolution * meters_per_unit * INCHES_PER_METER * DOTS_PER_INCH).round() as u64
}

/// `"Scale: 1:1,092,000"`
pub fn format_scale(denominator: u64) -> String {
    let digits = denominator.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("Scale: 1:{grouped}")
}
