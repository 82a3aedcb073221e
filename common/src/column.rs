//! シリアル番号列の自動検出
//!
//! ヘッダー名を3段階で照合する（完全一致 → 前方一致 → 部分一致）。
//! 段階の順序が優先で、同じ段階の中では左の列が優先。

/// 完全一致で照合するラベル
const EXACT_LABELS: &[&str] = &[
    "SERI NO",
    "SERI NUMARA",
    "SERI NUMARASI",
    "SERIAL NUMBER",
    "SERIAL NO",
    "SN",
];

/// 前方一致で照合する接頭辞
const PREFIX_LABELS: &[&str] = &["SERI NO", "SERI NUMARA", "SERIAL NUMBER", "SERIAL NO"];

/// 部分一致で照合する断片
const FRAGMENT_LABELS: &[&str] = &["SERI", "SERIAL", "NUMARA"];

/// どの段階で一致したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "完全一致"),
            MatchTier::Prefix => write!(f, "前方一致"),
            MatchTier::Substring => write!(f, "部分一致"),
        }
    }
}

impl MatchTier {
    fn matches(self, header: &str) -> bool {
        match self {
            MatchTier::Exact => EXACT_LABELS.iter().any(|l| *l == header),
            MatchTier::Prefix => PREFIX_LABELS.iter().any(|p| header.starts_with(*p)),
            MatchTier::Substring => FRAGMENT_LABELS.iter().any(|p| header.contains(*p)),
        }
    }
}

/// ヘッダー名を比較用に揃える（trim・大文字化・İ → I）
pub fn fold_header(header: &str) -> String {
    header.trim().to_uppercase().replace('İ', "I")
}

/// シリアル番号列のインデックスを返す
pub fn detect_serial_column<S: AsRef<str>>(headers: &[S]) -> Option<usize> {
    detect_serial_column_with_tier(headers).map(|(index, _)| index)
}

/// シリアル番号列のインデックスと一致段階を返す
pub fn detect_serial_column_with_tier<S: AsRef<str>>(headers: &[S]) -> Option<(usize, MatchTier)> {
    let folded: Vec<String> = headers.iter().map(|h| fold_header(h.as_ref())).collect();

    [MatchTier::Exact, MatchTier::Prefix, MatchTier::Substring]
        .into_iter()
        .find_map(|tier| {
            folded
                .iter()
                .position(|h| tier.matches(h))
                .map(|index| (index, tier))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mixed_case_turkish_label() {
        assert_eq!(detect_serial_column(&["ID", "Seri No", "Model"]), Some(1));
        assert_eq!(detect_serial_column(&["ID", "SERİ NUMARASI"]), Some(1));
    }

    #[test]
    fn test_detect_none() {
        assert_eq!(detect_serial_column(&["A", "B"]), None);
        assert_eq!(detect_serial_column::<&str>(&[]), None);
    }

    #[test]
    fn test_exact_tier_beats_earlier_prefix_match() {
        let headers = ["Serial Number Extra", "SN"];
        assert_eq!(
            detect_serial_column_with_tier(&headers),
            Some((1, MatchTier::Exact))
        );
    }

    #[test]
    fn test_prefix_tier_beats_substring() {
        let headers = ["Old Serial", "Serial No (new)"];
        assert_eq!(
            detect_serial_column_with_tier(&headers),
            Some((1, MatchTier::Prefix))
        );
    }

    #[test]
    fn test_leftmost_wins_within_tier() {
        let headers = ["Kalem", "Eski Seri", "Yeni Seri"];
        assert_eq!(
            detect_serial_column_with_tier(&headers),
            Some((1, MatchTier::Substring))
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(detect_serial_column(&["  sn  "]), Some(0));
    }
}
