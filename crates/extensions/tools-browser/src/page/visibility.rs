//! Visibility oracle.

use super::snapshot::StyleInfo;

/// Whether an element renders.
///
/// Uses the browser's own `checkVisibility()` verdict when the snapshot
/// carries one; otherwise falls back to display, visibility, opacity and a
/// non-empty box.
pub fn is_visible(style: &StyleInfo) -> bool {
    if let Some(native) = style.native {
        return native;
    }
    style.display != "none"
        && style.visibility != "hidden"
        && style.opacity != 0.0
        && !(style.width == 0.0 && style.height == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StyleInfo {
        StyleInfo::default()
    }

    #[test]
    fn test_native_verdict_wins() {
        let s = StyleInfo {
            native: Some(false),
            ..style()
        };
        assert!(!is_visible(&s));

        let s = StyleInfo {
            native: Some(true),
            display: "none".into(),
            ..style()
        };
        assert!(is_visible(&s));
    }

    #[test]
    fn test_fallback_rules() {
        assert!(is_visible(&style()));
        assert!(!is_visible(&StyleInfo { display: "none".into(), ..style() }));
        assert!(!is_visible(&StyleInfo { visibility: "hidden".into(), ..style() }));
        assert!(!is_visible(&StyleInfo { opacity: 0.0, ..style() }));
        assert!(!is_visible(&StyleInfo { width: 0.0, height: 0.0, ..style() }));
    }

    #[test]
    fn test_one_zero_dimension_is_visible() {
        assert!(is_visible(&StyleInfo { width: 0.0, height: 12.0, ..style() }));
        assert!(is_visible(&StyleInfo { width: 300.0, height: 0.0, ..style() }));
    }
}
