/// Target languages offered for translation.
///
/// Headlines are fetched in English, so [`Language::En`] is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
    Es,
    De,
    It,
    Pt,
    Hi,
    Ja,
    Zh,
}

impl Language {
    pub const DEFAULT: Language = Language::En;

    pub const ALL: [Language; 9] = [
        Language::En,
        Language::Fr,
        Language::Es,
        Language::De,
        Language::It,
        Language::Pt,
        Language::Hi,
        Language::Ja,
        Language::Zh,
    ];

    /// ISO 639-1 code, as sent to the translation service.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::De => "de",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Hi => "hi",
            Self::Ja => "ja",
            Self::Zh => "zh",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Fr => "French",
            Self::Es => "Spanish",
            Self::De => "German",
            Self::It => "Italian",
            Self::Pt => "Portuguese",
            Self::Hi => "Hindi",
            Self::Ja => "Japanese",
            Self::Zh => "Chinese",
        }
    }

    /// Look up a supported language by code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code))
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|l| *l == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("fr"), Some(Language::Fr));
        assert_eq!(Language::from_code("ZH"), Some(Language::Zh));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_codes_roundtrip_through_lookup() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }

    #[test]
    fn test_default_is_english() {
        assert!(Language::default().is_default());
        assert!(!Language::De.is_default());
        assert_eq!(Language::En.prev(), Language::Zh);
    }
}
