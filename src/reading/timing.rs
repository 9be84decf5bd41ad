//! Word pacing for engines that schedule boundaries themselves.
//!
//! A word's duration is the base WPM delay scaled by its strongest trailing
//! punctuation and by a penalty for long words.

/// Split trailing sentence punctuation and commas off a word.
pub fn extract_punctuation(word: &str) -> (&str, Vec<char>) {
    let trimmed = word.trim_end_matches(|c: char| is_sentence_terminator(c) || c == ',');
    (trimmed, word[trimmed.len()..].chars().collect())
}

fn is_sentence_terminator(c: char) -> bool {
    c == '.' || c == '?' || c == '!'
}

fn get_punctuation_multiplier(punctuation: char) -> f64 {
    match punctuation {
        '.' | '?' | '!' => 3.0,
        ',' => 1.5,
        _ => 1.0,
    }
}

fn get_max_punctuation_multiplier(punctuation_list: &[char]) -> f64 {
    punctuation_list
        .iter()
        .map(|&p| get_punctuation_multiplier(p))
        .fold(1.0, f64::max)
}

pub fn wpm_to_milliseconds(wpm: u32) -> u64 {
    (60_000.0 / wpm.max(1) as f64).round() as u64
}

fn get_word_length_penalty(word: &str, threshold: usize, penalty_multiplier: f64) -> f64 {
    if word.chars().count() > threshold {
        penalty_multiplier
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub wpm: u32,
    pub long_word_threshold: usize,
    pub long_word_penalty: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            wpm: 180,
            long_word_threshold: 10,
            long_word_penalty: 1.15,
        }
    }
}

impl Pacing {
    /// Milliseconds a word (with its trailing punctuation) stays current.
    pub fn word_delay_ms(&self, word: &str) -> u64 {
        let (text, punctuation) = extract_punctuation(word);
        let base_delay = wpm_to_milliseconds(self.wpm) as f64;
        let delay = base_delay
            * get_max_punctuation_multiplier(&punctuation)
            * get_word_length_penalty(text, self.long_word_threshold, self.long_word_penalty);
        delay.round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacing(wpm: u32) -> Pacing {
        Pacing {
            wpm,
            ..Pacing::default()
        }
    }

    #[test]
    fn test_wpm_to_milliseconds_precision_165() {
        // 60,000 / 165 = 363.636... must round, not truncate
        assert_eq!(wpm_to_milliseconds(165), 364);
    }

    #[test]
    fn test_wpm_to_milliseconds_zero_is_clamped() {
        assert_eq!(wpm_to_milliseconds(0), 60_000);
    }

    #[test]
    fn test_extract_punctuation() {
        assert_eq!(extract_punctuation("word?!"), ("word", vec!['?', '!']));
        assert_eq!(extract_punctuation("plain"), ("plain", vec![]));
        assert_eq!(extract_punctuation("..."), ("", vec!['.', '.', '.']));
    }

    #[test]
    fn test_max_punctuation_multiplier_stacking_rule() {
        assert_eq!(get_max_punctuation_multiplier(&[',', '!']), 3.0);
        assert_eq!(get_max_punctuation_multiplier(&[]), 1.0);
    }

    #[test]
    fn test_word_delay_basic() {
        assert_eq!(pacing(300).word_delay_ms("hello"), 200);
    }

    #[test]
    fn test_word_delay_with_comma() {
        assert_eq!(pacing(300).word_delay_ms("hello,"), 300);
    }

    #[test]
    fn test_word_delay_long_word_with_period() {
        // 200 * 3.0 * 1.15
        assert_eq!(pacing(300).word_delay_ms("extraordinarily."), 690);
    }
}
