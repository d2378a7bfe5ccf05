#![forbid(unsafe_code)]

//! Level catalog: the static content a session plays through.
//!
//! A [`Catalog`] holds the ordered levels, the three bucket definitions, and
//! every user-facing string ([`Messages`]). It is validated once at
//! construction and never mutated afterwards.
//!
//! # Invariants
//!
//! 1. At least one level, and every level has at least one item.
//! 2. Level ids are unique across the catalog.
//! 3. Item ids are unique within a level (the same id may appear in several
//!    levels with different categories).
//! 4. Exactly one bucket per [`Category`], in declaration order.
//!
//! # JSON content
//!
//! With the `json` feature a catalog can be read from a file of this shape.
//! `buckets` and `messages` are optional and default to the built-in copy.
//!
//! ```json
//! {
//!   "levels": [
//!     {
//!       "id": "scenario-1",
//!       "title": "Air volume and burn time",
//!       "description": "...",
//!       "question": "...",
//!       "items": [
//!         { "id": "bottle-size", "label": "Bottle size", "category": "manipulated" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::category::Category;

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// One draggable variable inside a level.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    /// Stable id, unique within its level.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Ground-truth category.
    pub category: Category,
}

impl Item {
    /// Create an item.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
        }
    }
}

/// One puzzle: a named experiment whose items must be sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Level {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Guiding question shown next to the scenario.
    pub question: String,
    pub items: Vec<Item>,
}

impl Level {
    /// Look up an item by id.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|it| it.id == id)
    }
}

/// A drop target for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Bucket {
    pub category: Category,
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

/// Category-specific hints shown after a wrong drop.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "json",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Hints {
    pub manipulated: String,
    pub controlled: String,
    pub responding: String,
}

/// Every user-facing string. Templates use `{title}` and `{n}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "json",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Messages {
    pub success: String,
    pub hints: Hints,
    /// Fallback when a hint key is not recognized.
    pub retry: String,
    pub reset: String,
    /// Shown when a level is entered, `{title}` is the level title.
    pub level_intro: String,
    pub level_cleared: String,
    pub cleared_detail: String,
    pub all_complete: String,
    pub app_title: String,
    /// Level selector label, `{n}` is the 1-based level number.
    pub level_tab: String,
    pub reset_label: String,
    pub next_label: String,
    pub empty_bucket: String,
    pub mission_label: String,
    pub question_label: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            success: "精確歸位！科學家魂爆發！🧪".into(),
            hints: Hints::default(),
            retry: "再試一次，邏輯就在細節中！".into(),
            reset: "本關已重置，重新開始吧！".into(),
            level_intro: "準備開始：{title}".into(),
            level_cleared: "恭喜完成這項研究！".into(),
            cleared_detail: "你精確地掌握了所有變因的關係。".into(),
            all_complete: "全部實驗完成！你已經是變因大師了！".into(),
            app_title: "變因歸位大作戰".into(),
            level_tab: "第 {n} 關".into(),
            reset_label: "重置本關".into(),
            next_label: "前往下個實驗".into(),
            empty_bucket: "等待歸位".into(),
            mission_label: "實驗任務".into(),
            question_label: "思考提問".into(),
        }
    }
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            manipulated: "不對喔！它是實驗中唯一被改變的「主角」。".into(),
            controlled: "為了公平，這個變因必須保持「固定不變」。".into(),
            responding: "這是我們最後要測量或觀察的「實驗結果」。".into(),
        }
    }
}

impl Messages {
    /// Hint for a category text key. Unknown keys get the generic retry hint.
    #[must_use]
    pub fn hint_for(&self, key: &str) -> &str {
        match Category::parse(key) {
            Some(Category::Manipulated) => &self.hints.manipulated,
            Some(Category::Controlled) => &self.hints.controlled,
            Some(Category::Responding) => &self.hints.responding,
            None => &self.retry,
        }
    }

    /// Level intro line for `title`.
    #[must_use]
    pub fn intro(&self, title: &str) -> String {
        self.level_intro.replace("{title}", title)
    }

    /// Level selector label for a zero-based index.
    #[must_use]
    pub fn tab(&self, index: usize) -> String {
        self.level_tab.replace("{n}", &(index + 1).to_string())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a catalog cannot be built.
#[derive(Debug)]
pub enum CatalogError {
    /// No levels at all.
    NoLevels,
    /// A level has no items.
    EmptyLevel { level: String },
    /// Two levels share an id.
    DuplicateLevel { level: String },
    /// Two items in one level share an id.
    DuplicateItem { level: String, item: String },
    /// No bucket declared for a category.
    MissingBucket(Category),
    /// More than one bucket declared for a category.
    DuplicateBucket(Category),
    /// Content file is not valid catalog JSON.
    Parse(String),
    /// Content file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLevels => write!(f, "catalog has no levels"),
            Self::EmptyLevel { level } => write!(f, "level {level:?} has no items"),
            Self::DuplicateLevel { level } => write!(f, "duplicate level id {level:?}"),
            Self::DuplicateItem { level, item } => {
                write!(f, "duplicate item id {item:?} in level {level:?}")
            }
            Self::MissingBucket(c) => write!(f, "no bucket for category {c}"),
            Self::DuplicateBucket(c) => write!(f, "more than one bucket for category {c}"),
            Self::Parse(msg) => write!(f, "invalid catalog content: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Validated, read-only game content.
#[derive(Debug, Clone)]
pub struct Catalog {
    levels: Vec<Level>,
    buckets: Vec<Bucket>,
    messages: Messages,
}

impl Catalog {
    /// Build and validate a catalog.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn new(
        levels: Vec<Level>,
        buckets: Vec<Bucket>,
        messages: Messages,
    ) -> Result<Self, CatalogError> {
        validate(&levels, &buckets)?;
        crate::debug!(
            target: crate::logging::TARGET,
            levels = levels.len(),
            "catalog validated"
        );
        Ok(Self {
            levels,
            buckets,
            messages,
        })
    }

    /// The four candle-and-jar scenarios of the classroom game.
    #[must_use]
    pub fn builtin() -> Self {
        use Category::{Controlled as C, Manipulated as M, Responding as R};

        fn level(id: &str, title: &str, description: &str, question: &str, items: &[(&str, &str, Category)]) -> Level {
            Level {
                id: id.into(),
                title: title.into(),
                description: description.into(),
                question: question.into(),
                items: items
                    .iter()
                    .map(|&(id, label, category)| Item::new(id, label, category))
                    .collect(),
            }
        }

        let levels = vec![
            level(
                "scenario-1",
                "空氣量與燃燒時間",
                "探索不同容量的廣口瓶中，蠟燭能燃燒多久？",
                "要把「瓶子大小」放在哪裡呢？",
                &[
                    ("bottle-size", "瓶子的大小", M),
                    ("candle-thickness", "蠟燭的粗細", C),
                    ("ignition-time", "點火的時間", C),
                    ("extinguish-time", "熄滅的秒數", R),
                    ("location", "實驗的地點", C),
                    ("cover-method", "瓶子的蓋法", C),
                ],
            ),
            level(
                "scenario-2",
                "有無瓶罩的比較",
                "如果不蓋瓶子 vs 蓋上瓶子，蠟燭的燃燒情形有何不同？",
                "在這個對照實驗中，誰是我們唯一改變的變項？",
                &[
                    ("bottle-presence", "有無罩瓶子", M),
                    ("candle-thickness", "蠟燭的粗細", C),
                    ("bottle-size", "瓶子的大小", C),
                    ("extinguish-time", "熄滅的秒數", R),
                    ("location", "實驗的地點", C),
                    ("ignition-time", "點火的時間", C),
                ],
            ),
            level(
                "scenario-3",
                "蠟燭粗細的影響",
                "在相同容量的瓶子中，粗蠟燭會燒得比細蠟燭久嗎？",
                "找出這場實驗中的主角！",
                &[
                    ("candle-thickness", "蠟燭的粗細", M),
                    ("bottle-size", "瓶子的大小", C),
                    ("ignition-time", "點火的時間", C),
                    ("extinguish-time", "熄滅的秒數", R),
                    ("location", "實驗的地點", C),
                    ("cover-method", "瓶子的蓋法", C),
                ],
            ),
            level(
                "scenario-4",
                "蠟燭長度實驗",
                "蠟燭的長短會影響氧氣消耗的速度進而影響燃燒時間嗎？",
                "請找出需要保持一致的「配角」變因！",
                &[
                    ("candle-length", "蠟燭的長短", M),
                    ("candle-thickness", "蠟燭的粗細", C),
                    ("bottle-size", "瓶子的大小", C),
                    ("extinguish-time", "熄滅的秒數", R),
                    ("location", "實驗的地點", C),
                    ("ignition-time", "點火的時間", C),
                ],
            ),
        ];

        let buckets = builtin_buckets();
        debug_assert!(
            validate(&levels, &buckets).is_ok(),
            "built-in catalog must satisfy the catalog invariants"
        );
        Self {
            levels,
            buckets,
            messages: Messages::default(),
        }
    }

    /// Parse and validate a JSON catalog.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Parse`] for malformed JSON or unknown category keys,
    /// otherwise any validation error from [`Catalog::new`].
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(file.levels, file.buckets, file.messages)
    }

    /// Read a JSON catalog from disk.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Io`] if the file cannot be read, otherwise as
    /// [`Catalog::from_json`].
    #[cfg(feature = "json")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `index`, if in range.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// All levels in play order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Buckets in display order.
    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The bucket for `category`.
    #[must_use]
    pub fn bucket(&self, category: Category) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.category == category)
    }

    /// User-facing copy.
    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Check the catalog invariants, reporting the first violation.
fn validate(levels: &[Level], buckets: &[Bucket]) -> Result<(), CatalogError> {
    if levels.is_empty() {
        return Err(CatalogError::NoLevels);
    }

    let mut level_ids = HashSet::new();
    for level in levels {
        if !level_ids.insert(level.id.as_str()) {
            return Err(CatalogError::DuplicateLevel {
                level: level.id.clone(),
            });
        }
        if level.items.is_empty() {
            return Err(CatalogError::EmptyLevel {
                level: level.id.clone(),
            });
        }
        let mut item_ids = HashSet::new();
        for item in &level.items {
            if !item_ids.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateItem {
                    level: level.id.clone(),
                    item: item.id.clone(),
                });
            }
        }
    }

    for category in Category::ALL {
        match buckets.iter().filter(|b| b.category == category).count() {
            0 => return Err(CatalogError::MissingBucket(category)),
            1 => {}
            _ => return Err(CatalogError::DuplicateBucket(category)),
        }
    }
    Ok(())
}

fn builtin_buckets() -> Vec<Bucket> {
    vec![
        Bucket {
            category: Category::Manipulated,
            title: "主角變因".into(),
            subtitle: "操作變因 (Independent)".into(),
            description: "只有一個，我們故意改變的部分。".into(),
        },
        Bucket {
            category: Category::Controlled,
            title: "配角變因".into(),
            subtitle: "控制變因 (Controlled)".into(),
            description: "必須保持一樣，確保實驗公平。".into(),
        },
        Bucket {
            category: Category::Responding,
            title: "結果變因".into(),
            subtitle: "應變變因 (Dependent)".into(),
            description: "最後產生的結果或測量的數值。".into(),
        },
    ]
}

#[cfg(feature = "json")]
#[derive(serde::Deserialize)]
struct CatalogFile {
    levels: Vec<Level>,
    #[serde(default = "builtin_buckets")]
    buckets: Vec<Bucket>,
    #[serde(default)]
    messages: Messages,
}
