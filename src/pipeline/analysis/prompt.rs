use crate::models::{AnalysisRequest, TestType};

pub const ANALYSIS_PREAMBLE: &str = r#"You are a medical analysis AI specialized in diabetes screening and monitoring. Your task is to analyze biometric data and provide precise blood glucose estimations.

# CONTEXT
Research has established correlations between breath acetone levels and blood glucose in diabetic patients. Breath acetone is the primary signal for this assessment. Higher acetone levels (measured in ppm) often indicate ketosis, which can suggest elevated blood glucose or insufficient insulin.
- Normal breath acetone: 0.5-2.0 ppm
- Elevated breath acetone: 2.0-5.0 ppm (mild ketosis)
- High breath acetone: >5.0 ppm (significant ketosis, often seen in uncontrolled diabetes)

Heart rate and oxygen saturation provide supporting context about overall cardiovascular health."#;

pub const REFERENCE_VALUES: &str = r#"# REFERENCE VALUES
- Fasting glucose:
  * Normal: <100 mg/dL
  * Prediabetic: 100-125 mg/dL
  * Diabetic: >126 mg/dL
- Random glucose:
  * Normal: <140 mg/dL
  * Prediabetic: 140-199 mg/dL
  * Diabetic: ≥200 mg/dL
- Post-meal glucose:
  * Normal: <140 mg/dL
  * Prediabetic: 140-199 mg/dL
  * Diabetic: ≥200 mg/dL"#;

pub const OUTPUT_FORMAT: &str = r#"# OUTPUT FORMAT
Return ONLY a valid JSON object with this exact structure:
{
  "glucoseEstimate": "XXX mg/dL",
  "glucoseRange": "XXX-XXX mg/dL",
  "glucoseStatus": "normal|prediabetic|diabetic",
  "diabetesRisk": "low|moderate|high",
  "recommendations": [
    "specific recommendation 1",
    "specific recommendation 2",
    "specific recommendation 3",
    "specific recommendation 4",
    "specific recommendation 5"
  ]
}"#;

/// Sentence describing when the reading was taken.
pub fn test_type_clause(test_type: TestType) -> &'static str {
    match test_type {
        TestType::Fasting => {
            "The reading was taken during a fasting state (no food for at least 8 hours)."
        }
        TestType::Postprandial => {
            "The reading was taken during a post-meal state (within 2 hours after eating)."
        }
        TestType::Random => {
            "The reading was taken during a random state (random/unknown time since last meal)."
        }
    }
}

fn prediabetic_clause(is_prediabetic: bool) -> &'static str {
    if is_prediabetic {
        "Patient has a known pre-diabetic condition."
    } else {
        "Patient has no known diabetic condition."
    }
}

fn additional_info_clause(additional_info: Option<&str>) -> String {
    match additional_info.map(str::trim) {
        Some(info) if !info.is_empty() => format!("\nAdditional patient information: {info}"),
        _ => String::new(),
    }
}

/// Build the glucose analysis prompt for one request.
///
/// Pure: identical requests always produce byte-identical prompts.
pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    let reading = &request.reading;
    let context = &request.context;

    let health_context = prediabetic_clause(context.is_prediabetic);
    let test_context = test_type_clause(context.test_type);
    let patient_info = additional_info_clause(context.additional_info.as_deref());
    let test_type = context.test_type.as_str();
    let risk_instruction = if context.is_prediabetic {
        "Account for the pre-diabetic condition in your assessment"
    } else {
        "Assess risk of pre-diabetes or diabetes"
    };

    let heart_rate = reading.heart_rate;
    let spo2 = reading.spo2;
    let acetone = reading.acetone;

    format!(
        r#"{ANALYSIS_PREAMBLE}

# PATIENT INFORMATION
{health_context}
{test_context}{patient_info}

# INPUT DATA
- Heart Rate: {heart_rate} bpm (normal range: 60-100 bpm)
- SpO2: {spo2}% (normal range: 95-100%)
- Breath Acetone: {acetone} ppm (normal range: 0.5-2.0 ppm, measured via MQ-138 sensor)

# ANALYSIS REQUIREMENTS
1. Estimate blood glucose range in mg/dL with a narrow margin (±10 mg/dL)
2. Consider the test type ({test_type}) when interpreting glucose values and apply the matching reference table below
3. {risk_instruction}
4. Primary correlation factor should be acetone level with supporting context from other metrics
5. Provide 3 to 5 specific, actionable health recommendations based on the estimated glucose level

{REFERENCE_VALUES}

{OUTPUT_FORMAT}
"#
    )
}
