use std::fmt;
use std::str::FromStr;

/// The twelve zodiac signs.
///
/// Each sign carries a stable ASCII id (used in URLs and icon names) and
/// a canonical Arabic name (used in prompts, cache keys and responses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Sign::Aries => "aries",
            Sign::Taurus => "taurus",
            Sign::Gemini => "gemini",
            Sign::Cancer => "cancer",
            Sign::Leo => "leo",
            Sign::Virgo => "virgo",
            Sign::Libra => "libra",
            Sign::Scorpio => "scorpio",
            Sign::Sagittarius => "sagittarius",
            Sign::Capricorn => "capricorn",
            Sign::Aquarius => "aquarius",
            Sign::Pisces => "pisces",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Sign::Aries => "الحمل",
            Sign::Taurus => "الثور",
            Sign::Gemini => "الجوزاء",
            Sign::Cancer => "السرطان",
            Sign::Leo => "الأسد",
            Sign::Virgo => "العذراء",
            Sign::Libra => "الميزان",
            Sign::Scorpio => "العقرب",
            Sign::Sagittarius => "القوس",
            Sign::Capricorn => "الجدي",
            Sign::Aquarius => "الدلو",
            Sign::Pisces => "الحوت",
        }
    }

    /// Icon filename shipped with the mobile client.
    pub fn icon(&self) -> String {
        format!("{}.png", self.id())
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arabic_name())
    }
}

impl FromStr for Sign {
    type Err = UnknownSign;

    /// Accepts either the ASCII id (case-insensitive) or the Arabic name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Sign::ALL
            .iter()
            .copied()
            .find(|sign| sign.id().eq_ignore_ascii_case(needle) || sign.arabic_name() == needle)
            .ok_or_else(|| UnknownSign(needle.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown zodiac sign: {0}")]
pub struct UnknownSign(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascii_id_and_arabic_name() {
        assert_eq!("aries".parse::<Sign>().unwrap(), Sign::Aries);
        assert_eq!("Scorpio".parse::<Sign>().unwrap(), Sign::Scorpio);
        assert_eq!("الحمل".parse::<Sign>().unwrap(), Sign::Aries);
        assert_eq!("الحوت".parse::<Sign>().unwrap(), Sign::Pisces);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!("ophiuchus".parse::<Sign>().is_err());
        assert!("".parse::<Sign>().is_err());
    }

    #[test]
    fn all_signs_are_distinct() {
        let mut ids: Vec<&str> = Sign::ALL.iter().map(|s| s.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }
}
