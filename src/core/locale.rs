//! # Localization
//!
//! Two locales (Chinese and English), a bilingual text value, and the
//! label tables used by every view.
//!
//! Result payloads carry `LocalizedText` so a view can switch language
//! without asking the analysis service again. There is exactly one
//! resolution rule, [`LocalizedText::resolve`]:
//!
//! ```text
//! requested locale → en → zh → ""
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh")]
    Zh,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn toggle(self) -> Locale {
        match self {
            Locale::Zh => Locale::En,
            Locale::En => Locale::Zh,
        }
    }

    /// Label of the *other* locale, shown on the toggle.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Locale::Zh => "EN",
            Locale::En => "中文",
        }
    }

    pub fn parse(value: &str) -> Option<Locale> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-tw" | "zh-cn" => Some(Locale::Zh),
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            _ => None,
        }
    }
}

/// A string that is either plain or carries one variant per locale.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zh: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        en: Option<String>,
    },
}

impl LocalizedText {
    pub fn both(zh: &str, en: &str) -> Self {
        LocalizedText::Localized {
            zh: Some(zh.to_string()),
            en: Some(en.to_string()),
        }
    }

    /// Resolve to `locale`, falling back to English, then Chinese, then `""`.
    /// Empty variants count as missing.
    pub fn resolve(&self, locale: Locale) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Localized { zh, en } => {
                fn pick(v: &Option<String>) -> Option<&str> {
                    v.as_deref().filter(|s| !s.is_empty())
                }
                let requested = match locale {
                    Locale::Zh => pick(zh),
                    Locale::En => pick(en),
                };
                requested.or_else(|| pick(en)).or_else(|| pick(zh)).unwrap_or("")
            }
        }
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

/// Resolve an optional field, empty when absent.
pub fn resolve_opt(value: Option<&LocalizedText>, locale: Locale) -> &str {
    value.map(|v| v.resolve(locale)).unwrap_or("")
}

/// All fixed UI strings for one locale.
pub struct Labels {
    pub brand: &'static str,
    pub brand_subtitle: &'static str,
    pub core_workflows: &'static str,
    pub new_chat: &'static str,
    pub recent_chats: &'static str,
    pub updated: &'static str,
    pub prototype_note: &'static str,
    pub search_chats: &'static str,
    pub active_thread: &'static str,
    pub rename_placeholder: &'static str,
    pub attach_placeholder: &'static str,
    pub empty_eyebrow: &'static str,
    pub empty_title: &'static str,
    pub empty_subtitle: &'static str,
    pub analyzing: &'static str,
    pub failed: &'static str,
    pub retry_hint: &'static str,
    pub user: &'static str,
    pub assistant: &'static str,
    pub result: &'static str,
    pub copied_json: &'static str,
    pub copied_summary: &'static str,
    pub exported: &'static str,
    pub shared: &'static str,
    pub copy_failed: &'static str,
    pub inserted: &'static str,
    pub cleared: &'static str,
    pub confirm_delete: &'static str,
    pub sidebar_help: &'static str,
    pub composer_help: &'static str,
    pub picker_title: &'static str,
    pub picker_help: &'static str,
    pub no_results: &'static str,
}

const ZH: Labels = Labels {
    brand: "WK Insight",
    brand_subtitle: "精密量測智慧助理",
    core_workflows: "三大功能",
    new_chat: "新對話",
    recent_chats: "最近對話",
    updated: "更新",
    prototype_note: "目前為 UI 原型；之後可將 mock 分析替換成 Vision API 呼叫。",
    search_chats: "搜尋對話",
    active_thread: "目前對話",
    rename_placeholder: "輸入新名稱",
    attach_placeholder: "圖片路徑",
    empty_eyebrow: "快速開始",
    empty_title: "開始新的量測分析",
    empty_subtitle: "先選一個功能，再附加照片或量測圖表。",
    analyzing: "分析中…",
    failed: "分析失敗",
    retry_hint: "Ctrl+R 重試",
    user: "使用者",
    assistant: "助理",
    result: "結果",
    copied_json: "已複製 JSON",
    copied_summary: "已複製摘要",
    exported: "已匯出對話",
    shared: "已分享對話",
    copy_failed: "複製失敗",
    inserted: "已插入摘要",
    cleared: "已清除對話",
    confirm_delete: "再按一次 d 確認刪除",
    sidebar_help: " n 新對話  r 改名  d 刪除  s 分享  / 搜尋  Enter 開啟  Esc 返回 ",
    composer_help: " Ctrl+N 新對話  Ctrl+O 對話列表  Ctrl+A 附加圖片  Ctrl+L 語言 ",
    picker_title: " 選擇功能 ",
    picker_help: " ↑↓ 選擇  Enter 確認  Esc 取消 ",
    no_results: "沒有符合的對話",
};

const EN: Labels = Labels {
    brand: "WK Insight",
    brand_subtitle: "Precision Measurement Intelligence",
    core_workflows: "Core Workflows",
    new_chat: "New chat",
    recent_chats: "Recent chats",
    updated: "Updated",
    prototype_note: "Prototype UI only. Replace the mock analysis later with your Vision API call.",
    search_chats: "Search chats",
    active_thread: "Active thread",
    rename_placeholder: "New name",
    attach_placeholder: "Image path",
    empty_eyebrow: "Quick start",
    empty_title: "Start a new measurement analysis",
    empty_subtitle: "Pick a workflow first, then attach a photo or a graph.",
    analyzing: "Analyzing…",
    failed: "Analysis failed",
    retry_hint: "Ctrl+R to retry",
    user: "User",
    assistant: "Assistant",
    result: "Result",
    copied_json: "JSON copied",
    copied_summary: "Summary copied",
    exported: "Thread exported",
    shared: "Thread shared",
    copy_failed: "Copy failed",
    inserted: "Summary inserted",
    cleared: "Thread cleared",
    confirm_delete: "Press d again to confirm delete",
    sidebar_help: " n New  r Rename  d Delete  s Share  / Search  Enter Open  Esc Back ",
    composer_help: " Ctrl+N New  Ctrl+O Chats  Ctrl+A Attach  Ctrl+L Language ",
    picker_title: " Choose a workflow ",
    picker_help: " ↑↓ Select  Enter Confirm  Esc Cancel ",
    no_results: "No matching chats",
};

pub fn labels(locale: Locale) -> &'static Labels {
    match locale {
        Locale::Zh => &ZH,
        Locale::En => &EN,
    }
}
