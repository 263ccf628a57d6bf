//! Static registry of voices accepted by the synthesis service.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::params::DEFAULT_VOICE;

/// Voice id to language code, mirroring the service catalogue.
const SUPPORTED_VOICES: &[(&str, &str)] = &[
    ("ar-EG-SalmaNeural", "ar-EG"),
    ("ar-SA-HamedNeural", "ar-SA"),
    ("cs-CZ-AntoninNeural", "cs-CZ"),
    ("cs-CZ-VlastaNeural", "cs-CZ"),
    ("da-DK-ChristelNeural", "da-DK"),
    ("da-DK-JeppeNeural", "da-DK"),
    ("de-AT-IngridNeural", "de-AT"),
    ("de-AT-JonasNeural", "de-AT"),
    ("de-CH-JanNeural", "de-CH"),
    ("de-CH-LeniNeural", "de-CH"),
    ("de-DE-AmalaNeural", "de-DE"),
    ("de-DE-ConradNeural", "de-DE"),
    ("de-DE-KatjaNeural", "de-DE"),
    ("de-DE-KillianNeural", "de-DE"),
    ("el-GR-AthinaNeural", "el-GR"),
    ("el-GR-NestorasNeural", "el-GR"),
    ("en-AU-NatashaNeural", "en-AU"),
    ("en-AU-WilliamNeural", "en-AU"),
    ("en-CA-ClaraNeural", "en-CA"),
    ("en-CA-LiamNeural", "en-CA"),
    ("en-GB-LibbyNeural", "en-GB"),
    ("en-GB-MaisieNeural", "en-GB"),
    ("en-GB-RyanNeural", "en-GB"),
    ("en-GB-SoniaNeural", "en-GB"),
    ("en-GB-ThomasNeural", "en-GB"),
    ("en-IE-ConnorNeural", "en-IE"),
    ("en-IE-EmilyNeural", "en-IE"),
    ("en-IN-NeerjaNeural", "en-IN"),
    ("en-IN-PrabhatNeural", "en-IN"),
    ("en-NZ-MitchellNeural", "en-NZ"),
    ("en-NZ-MollyNeural", "en-NZ"),
    ("en-US-AnaNeural", "en-US"),
    ("en-US-AriaNeural", "en-US"),
    ("en-US-ChristopherNeural", "en-US"),
    ("en-US-EricNeural", "en-US"),
    ("en-US-GuyNeural", "en-US"),
    ("en-US-JennyNeural", "en-US"),
    ("en-US-MichelleNeural", "en-US"),
    ("es-ES-AlvaroNeural", "es-ES"),
    ("es-ES-ElviraNeural", "es-ES"),
    ("es-MX-DaliaNeural", "es-MX"),
    ("es-MX-JorgeNeural", "es-MX"),
    ("fi-FI-HarriNeural", "fi-FI"),
    ("fi-FI-NooraNeural", "fi-FI"),
    ("fr-CA-AntoineNeural", "fr-CA"),
    ("fr-CA-SylvieNeural", "fr-CA"),
    ("fr-FR-DeniseNeural", "fr-FR"),
    ("fr-FR-EloiseNeural", "fr-FR"),
    ("fr-FR-HenriNeural", "fr-FR"),
    ("hi-IN-MadhurNeural", "hi-IN"),
    ("hi-IN-SwaraNeural", "hi-IN"),
    ("it-IT-DiegoNeural", "it-IT"),
    ("it-IT-ElsaNeural", "it-IT"),
    ("it-IT-IsabellaNeural", "it-IT"),
    ("ja-JP-KeitaNeural", "ja-JP"),
    ("ja-JP-NanamiNeural", "ja-JP"),
    ("ko-KR-InJoonNeural", "ko-KR"),
    ("ko-KR-SunHiNeural", "ko-KR"),
    ("nb-NO-FinnNeural", "nb-NO"),
    ("nb-NO-PernilleNeural", "nb-NO"),
    ("nl-NL-ColetteNeural", "nl-NL"),
    ("nl-NL-FennaNeural", "nl-NL"),
    ("nl-NL-MaartenNeural", "nl-NL"),
    ("pl-PL-MarekNeural", "pl-PL"),
    ("pl-PL-ZofiaNeural", "pl-PL"),
    ("pt-BR-AntonioNeural", "pt-BR"),
    ("pt-BR-FranciscaNeural", "pt-BR"),
    ("pt-PT-DuarteNeural", "pt-PT"),
    ("pt-PT-RaquelNeural", "pt-PT"),
    ("ru-RU-DmitryNeural", "ru-RU"),
    ("ru-RU-SvetlanaNeural", "ru-RU"),
    ("sv-SE-MattiasNeural", "sv-SE"),
    ("sv-SE-SofieNeural", "sv-SE"),
    ("tr-TR-AhmetNeural", "tr-TR"),
    ("tr-TR-EmelNeural", "tr-TR"),
    ("uk-UA-OstapNeural", "uk-UA"),
    ("uk-UA-PolinaNeural", "uk-UA"),
    ("zh-CN-XiaoxiaoNeural", "zh-CN"),
    ("zh-CN-XiaoyiNeural", "zh-CN"),
    ("zh-CN-YunjianNeural", "zh-CN"),
    ("zh-CN-YunxiNeural", "zh-CN"),
    ("zh-CN-YunyangNeural", "zh-CN"),
    ("zh-HK-HiuGaaiNeural", "zh-HK"),
    ("zh-HK-WanLungNeural", "zh-HK"),
    ("zh-TW-HsiaoChenNeural", "zh-TW"),
    ("zh-TW-YunJheNeural", "zh-TW"),
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: &'static str,
    pub language: &'static str,
}

/// Catalogue lookups grouped by language.
#[derive(Debug)]
pub struct VoiceRegistry {
    by_language: BTreeMap<&'static str, Vec<VoiceInfo>>,
}

impl VoiceRegistry {
    /// Shared registry built on first use.
    pub fn global() -> &'static VoiceRegistry {
        static REGISTRY: OnceLock<VoiceRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut by_language: BTreeMap<&'static str, Vec<VoiceInfo>> = BTreeMap::new();
            for &(id, language) in SUPPORTED_VOICES {
                by_language
                    .entry(language)
                    .or_default()
                    .push(VoiceInfo { id, language });
            }
            VoiceRegistry { by_language }
        })
    }

    pub fn contains(&self, voice_id: &str) -> bool {
        self.language_of(voice_id).is_some()
    }

    pub fn language_of(&self, voice_id: &str) -> Option<&'static str> {
        self.by_language
            .values()
            .flatten()
            .find(|v| v.id == voice_id)
            .map(|v| v.language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_language.keys().copied()
    }

    pub fn voices_for(&self, language: &str) -> &[VoiceInfo] {
        self.by_language
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all(&self) -> impl Iterator<Item = &VoiceInfo> + '_ {
        self.by_language.values().flatten()
    }

    /// First voice for the language, falling back to the service default.
    pub fn default_voice(&self, language: &str) -> &'static str {
        self.voices_for(language)
            .first()
            .map(|v| v.id)
            .unwrap_or(DEFAULT_VOICE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_voice_is_registered() {
        assert!(VoiceRegistry::global().contains(DEFAULT_VOICE));
    }

    #[test]
    fn unknown_voice_is_rejected() {
        let registry = VoiceRegistry::global();
        assert!(!registry.contains("xx-XX-NobodyNeural"));
        assert_eq!(registry.language_of("xx-XX-NobodyNeural"), None);
    }

    #[test]
    fn voices_group_under_their_language() {
        let registry = VoiceRegistry::global();
        assert_eq!(registry.language_of("de-DE-KatjaNeural"), Some("de-DE"));
        assert!(registry
            .voices_for("de-DE")
            .iter()
            .all(|v| v.language == "de-DE"));
    }

    #[test]
    fn language_fallback_uses_service_default() {
        let registry = VoiceRegistry::global();
        assert_eq!(registry.default_voice("xx-XX"), DEFAULT_VOICE);
        assert_eq!(registry.default_voice("ja-JP"), "ja-JP-KeitaNeural");
    }

    #[test]
    fn languages_are_sorted_and_unique() {
        let langs: Vec<&str> = VoiceRegistry::global().languages().collect();
        let mut sorted = langs.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(langs, sorted);
    }
}
