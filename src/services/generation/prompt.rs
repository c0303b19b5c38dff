#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadshotStyle {
    Corporate,
    Creative,
    Casual,
    Executive,
    Tech,
    Academic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleProfile {
    pub style: &'static str,
    pub background: &'static str,
    pub lighting: &'static str,
    pub expression: &'static str,
}

impl HeadshotStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "corporate" => Some(Self::Corporate),
            "creative" => Some(Self::Creative),
            "casual" => Some(Self::Casual),
            "executive" => Some(Self::Executive),
            "tech" => Some(Self::Tech),
            "academic" => Some(Self::Academic),
            _ => None,
        }
    }

    pub fn profile(self) -> StyleProfile {
        match self {
            Self::Corporate => StyleProfile {
                style: "professional corporate headshot with business attire",
                background: "clean neutral background",
                lighting: "professional studio lighting with soft shadows",
                expression: "confident and approachable expression",
            },
            Self::Creative => StyleProfile {
                style: "creative professional headshot with an artistic flair, modern and stylish",
                background: "subtle artistic background with soft bokeh",
                lighting: "dramatic side lighting with artistic shadows",
                expression: "expressive and engaging look",
            },
            Self::Casual => StyleProfile {
                style: "casual professional headshot, approachable yet professional look",
                background: "soft blurred natural background",
                lighting: "natural lighting with gentle highlights",
                expression: "friendly and approachable smile",
            },
            Self::Executive => StyleProfile {
                style: "executive leadership headshot with formal business attire",
                background: "premium dark gradient background",
                lighting: "professional three-point lighting setup",
                expression: "authoritative and trustworthy expression",
            },
            Self::Tech => StyleProfile {
                style: "modern tech professional headshot",
                background: "subtle tech-themed or gradient background",
                lighting: "clean modern lighting with blue undertones",
                expression: "focused and innovative expression",
            },
            Self::Academic => StyleProfile {
                style: "scholarly professional headshot suitable for academic profiles",
                background: "neutral bookshelf or institutional background",
                lighting: "soft even lighting with minimal shadows",
                expression: "thoughtful and knowledgeable expression",
            },
        }
    }
}

/// Unknown styles get empty descriptions rather than an error.
pub fn profile_for(style: &str) -> StyleProfile {
    HeadshotStyle::from_name(style)
        .map(HeadshotStyle::profile)
        .unwrap_or_default()
}

pub fn intensity_label(intensity: f64) -> &'static str {
    if intensity < 33.0 {
        "subtle"
    } else if intensity < 66.0 {
        "balanced"
    } else {
        "dramatic"
    }
}

pub fn build_prompt(style: &str, intensity: f64) -> String {
    let profile = profile_for(style);
    format!(
        "Transform this photo into a {} {}. \
         Make it look like a high-quality professional headshot with a {}. \
         Use {} to highlight the subject's features. \
         The subject should have a {}. \
         Maintain the person's identity but enhance the professional appearance. \
         Ensure proper framing with head and shoulders visible, professional color grading, and subtle skin retouching.",
        intensity_label(intensity),
        profile.style,
        profile.background,
        profile.lighting,
        profile.expression,
    )
}
