use crate::inputs::{ClassifierInput, MultiOptions};
use crate::scoring::{clamp_score, SCORE_MAX};
use crate::variables::{MultiSelectField, VariableKey, VariableKind};

/// Raw value at which each linear variable saturates at 100.
const SKU_COUNT_SATURATION: f64 = 2_000.0;
const ORDER_VOLUME_SATURATION: f64 = 20_000.0;
const ORDER_PEAK_SATURATION: f64 = 40_000.0;
/// Department count 1 maps to 0, 7 maps to 100.
const AFDELINGEN_BASE: f64 = 1.0;
const AFDELINGEN_SPAN: f64 = 6.0;

/// Normalised 0..100 complexity score of one variable.
pub fn score_variable(key: VariableKey, input: &ClassifierInput) -> f64 {
    match key.kind() {
        VariableKind::Linear => score_linear(key, input.numeric(key).unwrap_or(0.0)),
        VariableKind::Categorical(field) => field.table().score(input.choice(field)),
        VariableKind::MultiSelect(field) => score_multi_select(field, input.options(field)),
    }
}

pub fn score_linear(key: VariableKey, value: f64) -> f64 {
    let scaled = match key {
        VariableKey::SkuCount => value / SKU_COUNT_SATURATION * 100.0,
        VariableKey::OrderVolume => value / ORDER_VOLUME_SATURATION * 100.0,
        VariableKey::OrderPeak => value / ORDER_PEAK_SATURATION * 100.0,
        VariableKey::RetourPercentage => value,
        VariableKey::AantalAfdelingen => (value - AFDELINGEN_BASE) / AFDELINGEN_SPAN * 100.0,
        _ => 0.0,
    };
    clamp_score(scaled)
}

/// Share of selected options scaled to 0..100; an empty set scores 0 before
/// inversion.
pub fn selected_fraction_score(options: &MultiOptions) -> f64 {
    if options.is_empty() {
        return 0.0;
    }
    let selected = options.values().filter(|selected| **selected).count();
    clamp_score(selected as f64 / options.len() as f64 * 100.0)
}

pub fn score_multi_select(field: MultiSelectField, options: &MultiOptions) -> f64 {
    let fraction = selected_fraction_score(options);
    if field.is_inverted() {
        clamp_score(SCORE_MAX - fraction)
    } else {
        fraction
    }
}

#[cfg(test)]
mod tests {
    use super::{score_linear, score_variable};
    use crate::inputs::ClassifierInput;
    use crate::variables::{MultiSelectField, VariableKey};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn linear_variables_scale_and_clamp() {
        assert!(approx(score_linear(VariableKey::SkuCount, 300.0), 15.0));
        assert!(approx(score_linear(VariableKey::SkuCount, 5_000.0), 100.0));
        assert!(approx(score_linear(VariableKey::OrderVolume, 5_000.0), 25.0));
        assert!(approx(score_linear(VariableKey::OrderPeak, 8_000.0), 20.0));
        assert!(approx(score_linear(VariableKey::RetourPercentage, 7.0), 7.0));
        assert!(approx(score_linear(VariableKey::RetourPercentage, 140.0), 100.0));
        assert!(approx(score_linear(VariableKey::AantalAfdelingen, 1.0), 0.0));
        assert!(approx(score_linear(VariableKey::AantalAfdelingen, 4.0), 50.0));
        assert!(approx(score_linear(VariableKey::AantalAfdelingen, 7.0), 100.0));
        assert!(approx(score_linear(VariableKey::AantalAfdelingen, 0.0), 0.0));
        assert!(approx(score_linear(VariableKey::AantalAfdelingen, 12.0), 100.0));
        assert!(approx(score_linear(VariableKey::SkuCount, -10.0), 0.0));
    }

    #[test]
    fn categorical_variables_use_tables_and_fallbacks() {
        let mut input = ClassifierInput::default();
        assert_eq!(score_variable(VariableKey::SkuComplexity, &input), 50.0);
        assert_eq!(score_variable(VariableKey::TypeKoppeling, &input), 70.0);

        input.platform_type = "UnknownPlatform".to_string();
        assert_eq!(score_variable(VariableKey::PlatformType, &input), 50.0);
        input.sku_complexity = String::new();
        assert_eq!(score_variable(VariableKey::SkuComplexity, &input), 40.0);
    }

    #[test]
    fn multi_selects_score_selected_fraction() {
        let input = ClassifierInput::default();
        assert!(approx(
            score_variable(VariableKey::VasActiviteiten, &input),
            100.0 / 3.0
        ));
        assert!(approx(
            score_variable(VariableKey::InboundBijzonderheden, &input),
            200.0 / 3.0
        ));
    }

    #[test]
    fn postnl_apis_score_is_inverted() {
        let mut input = ClassifierInput::default();
        assert_eq!(score_variable(VariableKey::PostnlApis, &input), 0.0);

        input.set_option(MultiSelectField::PostnlApis, "Checkout", false);
        assert!(approx(score_variable(VariableKey::PostnlApis, &input), 25.0));

        input.postnl_apis.clear();
        assert_eq!(score_variable(VariableKey::PostnlApis, &input), 100.0);
        input.vas_activiteiten.clear();
        assert_eq!(score_variable(VariableKey::VasActiviteiten, &input), 0.0);
    }

    #[test]
    fn unknown_option_labels_count_toward_the_total() {
        let mut input = ClassifierInput::default();
        input.set_option(MultiSelectField::VasActiviteiten, "kitting", true);
        assert!(approx(score_variable(VariableKey::VasActiviteiten, &input), 50.0));
    }
}
