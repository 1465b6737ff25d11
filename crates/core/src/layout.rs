//! Layout selection for content slides.

use crate::types::{Layout, SlideRecord};

/// More items than this go to two columns.
const TWO_COLUMN_THRESHOLD: usize = 5;

/// Big-number slides hold at most this many items.
const BIG_NUMBER_MAX_ITEMS: usize = 3;

/// Markers that make a short numeric slide read as a statistic.
const STAT_MARKERS: &[char] = &['%', '$', 'M', 'K'];

/// Guess a layout for a content slide from its items.
///
/// First match wins:
/// 1. more than five items: two columns
/// 2. at most three items whose text has a digit and a stat marker: big number
/// 3. otherwise: bullets
pub fn choose_layout(slide: &SlideRecord) -> Layout {
    choose_layout_for_items(&slide.bullet_items)
}

/// [`choose_layout`] over a bare item list.
pub fn choose_layout_for_items(items: &[String]) -> Layout {
    if items.len() > TWO_COLUMN_THRESHOLD {
        return Layout::TwoColumn;
    }

    if items.len() <= BIG_NUMBER_MAX_ITEMS {
        let text = items.join(" ");
        let has_digit = text.chars().any(|c| c.is_ascii_digit());
        let has_marker = text.contains(STAT_MARKERS);
        if has_digit && has_marker {
            return Layout::BigNumber;
        }
    }

    Layout::Bullets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_six_items_always_two_column() {
        let numbers = items(&["1%", "2%", "3%", "4%", "5%", "6%"]);
        let words = items(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(choose_layout_for_items(&numbers), Layout::TwoColumn);
        assert_eq!(choose_layout_for_items(&words), Layout::TwoColumn);
    }

    #[test]
    fn test_big_number_needs_digit_and_marker() {
        assert_eq!(
            choose_layout_for_items(&items(&["Revenue up 15%", "Costs down 8%"])),
            Layout::BigNumber
        );
        assert_eq!(
            choose_layout_for_items(&items(&["Profit $450", "Stable"])),
            Layout::BigNumber
        );
        assert_eq!(choose_layout_for_items(&items(&["2.4M users"])), Layout::BigNumber);
        assert_eq!(
            choose_layout_for_items(&items(&["Launched in 2024", "Two regions"])),
            Layout::Bullets
        );
        assert_eq!(
            choose_layout_for_items(&items(&["Margins up", "Share up%"])),
            Layout::Bullets
        );
    }

    #[test]
    fn test_only_decimal_digits_count() {
        assert_eq!(choose_layout_for_items(&items(&["½ off, $ saved"])), Layout::Bullets);
        assert_eq!(choose_layout_for_items(&items(&["Ⅻ markets, 40% share"])), Layout::BigNumber);
    }

    #[test]
    fn test_four_or_five_items_are_bullets() {
        let four = items(&["15%", "8%", "$3", "2K"]);
        assert_eq!(choose_layout_for_items(&four), Layout::Bullets);
        let five = items(&["a", "b", "c", "d", "e"]);
        assert_eq!(choose_layout_for_items(&five), Layout::Bullets);
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(choose_layout_for_items(&items(&["3 km"])), Layout::Bullets);
        assert_eq!(choose_layout_for_items(&items(&["3 KM"])), Layout::BigNumber);
    }

    #[test]
    fn test_empty_slide_is_bullets() {
        assert_eq!(choose_layout(&SlideRecord::content("Empty", Vec::new())), Layout::Bullets);
    }

    #[test]
    fn test_choice_is_deterministic() {
        let slide = SlideRecord::content("Q1", items(&["Revenue up 15%", "Costs down 8%"]));
        assert_eq!(choose_layout(&slide), choose_layout(&slide.clone()));
    }
}
