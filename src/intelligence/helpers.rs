/// Body-mass index from height in centimetres and weight in kilograms.
/// None when either measurement is missing or not positive.
pub fn bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    let h = height_cm.filter(|h| h.is_finite() && *h > 0.0)? / 100.0;
    let w = weight_kg.filter(|w| w.is_finite() && *w > 0.0)?;
    Some(w / (h * h))
}

/// BMI band with the value to one decimal, e.g. "Normal (BMI 22.9)".
pub fn bmi_status(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<String> {
    let value = bmi(height_cm, weight_kg)?;
    let band = if value < 18.5 {
        "Underweight"
    } else if value < 25.0 {
        "Normal"
    } else if value < 30.0 {
        "Overweight"
    } else {
        "Obese"
    };
    Some(format!("{band} (BMI {value:.1})"))
}
