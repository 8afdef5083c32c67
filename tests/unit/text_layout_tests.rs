/*!
 * Tests for pixel-based word wrapping
 */

use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;

use slidecast::text_layout::{estimate_width, FixedAdvanceMeasurer, TextWrapper};

fn font() -> PathBuf {
    PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf")
}

fn wrapper() -> TextWrapper {
    TextWrapper::new(Arc::new(FixedAdvanceMeasurer::new(0.6)))
}

/// Wrapping never splits a word, whatever the budget
#[test]
fn test_wrap_withRandomWords_shouldNeverBreakWords() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let word_count = rng.random_range(1..25);
        let words: Vec<String> = (0..word_count)
            .map(|_| {
                let len = rng.random_range(1..15);
                "w".repeat(len)
            })
            .collect();
        let text = words.join(" ");
        let budget = rng.random_range(20.0..800.0);

        let wrapped = wrapper().wrap(&text, &font(), 20, budget);

        // Joining the lines back with spaces restores the original text,
        // so no word was cut in half
        assert_eq!(wrapped.replace('\n', " "), text);
    }
}

/// Every line except oversized single words fits the budget
#[test]
fn test_wrap_withMeasurer_shouldRespectBudget() {
    // 12px per char at size 20 with advance 0.6
    let text = "alpha beta gamma delta epsilon zeta eta theta";
    let wrapped = wrapper().wrap(text, &font(), 20, 200.0);

    for line in wrapped.lines() {
        let words: Vec<&str> = line.split(' ').collect();
        if words.len() > 1 {
            assert!(
                line.chars().count() as f32 * 12.0 <= 200.0,
                "multi-word line exceeds budget: {:?}",
                line
            );
        }
    }
}

/// A word wider than the budget still lands on its own line
#[test]
fn test_wrap_withOversizedWord_shouldMakeProgress() {
    let text = "short absurdlyoverlongsingleword short";
    let wrapped = wrapper().wrap(text, &font(), 20, 100.0);

    assert!(wrapped.lines().any(|l| l == "absurdlyoverlongsingleword"));
}

/// Without a measurer the estimate drives wrapping and nothing fails
#[test]
fn test_wrap_withoutMeasurer_shouldFallBackToEstimate() {
    let wrapper = TextWrapper::without_measurer();
    let text = "one two three four five six seven";

    // estimate: 6.5px/char at size 10
    let wrapped = wrapper.wrap(text, &font(), 10, 65.0);

    assert!(wrapped.contains('\n'));
    assert_eq!(wrapped.replace('\n', " "), text);
}

/// The estimate is the documented conservative formula
#[test]
fn test_estimate_width_shouldBeLengthTimesSizeFactor() {
    assert!((estimate_width("hello", 75) - 5.0 * 75.0 * 0.65).abs() < 1e-3);
}

/// Empty and whitespace-only input wraps to an empty string
#[test]
fn test_wrap_withEmptyText_shouldReturnEmpty() {
    assert_eq!(wrapper().wrap("", &font(), 20, 100.0), "");
    assert_eq!(wrapper().wrap("   ", &font(), 20, 100.0), "");
}
