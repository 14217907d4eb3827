//! Findings and the localized report.
//!
//! A check produces zero or more `Finding`s. A finding carries no message
//! text of its own; the text is resolved through a `Locale` table keyed by
//! the closed `ErrorKind` enum, so every producible kind is known at compile
//! time and every locale table is validated at startup.

use std::collections::HashMap;

use anyhow::{Result, bail};

/// The fixed style-lint rule set (see `analyze`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintRule {
    NoDuplicateSelectors,
    BlockNoEmpty,
    DeclarationBlockNoDuplicateProperties,
    BlockOpeningBraceSpaceBefore,
    DeclarationBlockSemicolonNewlineAfter,
    BlockOpeningBraceNewlineAfter,
    BlockClosingBraceNewlineBefore,
    PropertyDisallowedList,
}

impl LintRule {
    pub const ALL: [LintRule; 8] = [
        LintRule::NoDuplicateSelectors,
        LintRule::BlockNoEmpty,
        LintRule::DeclarationBlockNoDuplicateProperties,
        LintRule::BlockOpeningBraceSpaceBefore,
        LintRule::DeclarationBlockSemicolonNewlineAfter,
        LintRule::BlockOpeningBraceNewlineAfter,
        LintRule::BlockClosingBraceNewlineBefore,
        LintRule::PropertyDisallowedList,
    ];

    /// The rule name as it appears in the finding id (`stylelint.<name>`).
    pub fn name(self) -> &'static str {
        match self {
            LintRule::NoDuplicateSelectors => "no-duplicate-selectors",
            LintRule::BlockNoEmpty => "block-no-empty",
            LintRule::DeclarationBlockNoDuplicateProperties => {
                "declaration-block-no-duplicate-properties"
            }
            LintRule::BlockOpeningBraceSpaceBefore => "block-opening-brace-space-before",
            LintRule::DeclarationBlockSemicolonNewlineAfter => {
                "declaration-block-semicolon-newline-after"
            }
            LintRule::BlockOpeningBraceNewlineAfter => "block-opening-brace-newline-after",
            LintRule::BlockClosingBraceNewlineBefore => "block-closing-brace-newline-before",
            LintRule::PropertyDisallowedList => "property-disallowed-list",
        }
    }
}

/// Every kind of finding the checks can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StructureFile,
    StructureDirectory,
    W3c,
    Stylelint(LintRule),
    OrderStylesheetLinks,
    AlternativeFonts,
    BodyTagsMissing,
    BodyTagsExtra,
    LangAttrMissing,
    TitleEmmet,
    MetaTagsMissing,
    FaviconsMissing,
    MobileFaviconMissing,
    ElementProperties,
    VideoAttributesMissing,
    VideoAttributesExtra,
    CountPseudoElements,
    LayoutDifferent,
}

impl ErrorKind {
    /// Every producible kind, including one entry per lint rule. Used to
    /// validate locale tables at startup.
    pub fn all() -> Vec<ErrorKind> {
        let mut kinds = vec![
            ErrorKind::StructureFile,
            ErrorKind::StructureDirectory,
            ErrorKind::W3c,
            ErrorKind::OrderStylesheetLinks,
            ErrorKind::AlternativeFonts,
            ErrorKind::BodyTagsMissing,
            ErrorKind::BodyTagsExtra,
            ErrorKind::LangAttrMissing,
            ErrorKind::TitleEmmet,
            ErrorKind::MetaTagsMissing,
            ErrorKind::FaviconsMissing,
            ErrorKind::MobileFaviconMissing,
            ErrorKind::ElementProperties,
            ErrorKind::VideoAttributesMissing,
            ErrorKind::VideoAttributesExtra,
            ErrorKind::CountPseudoElements,
            ErrorKind::LayoutDifferent,
        ];
        kinds.extend(LintRule::ALL.into_iter().map(ErrorKind::Stylelint));
        kinds
    }

    /// Dotted rule identifier, e.g. `structure.file` or
    /// `stylelint.no-duplicate-selectors`.
    pub fn code(self) -> String {
        match self {
            ErrorKind::StructureFile => "structure.file".to_string(),
            ErrorKind::StructureDirectory => "structure.directory".to_string(),
            ErrorKind::W3c => "w3c".to_string(),
            ErrorKind::Stylelint(rule) => format!("stylelint.{}", rule.name()),
            ErrorKind::OrderStylesheetLinks => "orderStylesheetLinks".to_string(),
            ErrorKind::AlternativeFonts => "alternativeFonts".to_string(),
            ErrorKind::BodyTagsMissing => "bodyTagsMissing".to_string(),
            ErrorKind::BodyTagsExtra => "bodyTagsExtra".to_string(),
            ErrorKind::LangAttrMissing => "langAttrMissing".to_string(),
            ErrorKind::TitleEmmet => "titleEmmet".to_string(),
            ErrorKind::MetaTagsMissing => "metaTagsMissing".to_string(),
            ErrorKind::FaviconsMissing => "faviconsMissing".to_string(),
            ErrorKind::MobileFaviconMissing => "mobileFaviconMissing".to_string(),
            ErrorKind::ElementProperties => "elementProperties".to_string(),
            ErrorKind::VideoAttributesMissing => "videoAttributesMissing".to_string(),
            ErrorKind::VideoAttributesExtra => "videoAttributesExtra".to_string(),
            ErrorKind::CountPseudoElements => "countPseudoElements".to_string(),
            ErrorKind::LayoutDifferent => "layoutDifferent".to_string(),
        }
    }
}

/// A single rule violation: a kind plus the values its message template
/// interpolates. Insertion order of values is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: ErrorKind,
    pub values: Vec<(&'static str, String)>,
}

impl Finding {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.push((key, value.into()));
        self
    }
}

/// Flat ordered list of findings, in check-declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Render the numbered, localized report text. Lines are joined with
    /// CRLF, matching the result artifact format.
    pub fn render(&self, locale: &Locale) -> String {
        self.findings
            .iter()
            .enumerate()
            .map(|(index, finding)| format!("{}. {}", index + 1, locale.resolve(finding)))
            .collect::<Vec<_>>()
            .join("\r\n")
    }
}

/// Immutable message resolver for one language. Construction fails if the
/// language is unknown or the table misses any producible kind.
#[derive(Debug)]
pub struct Locale {
    header: &'static str,
    templates: HashMap<ErrorKind, &'static str>,
}

impl Locale {
    pub fn new(language: &str) -> Result<Self> {
        let (header, table) = match language {
            "ru" => (RU_HEADER, ru_table()),
            "en" => (EN_HEADER, en_table()),
            other => bail!("unsupported report language: {other}"),
        };
        let templates: HashMap<ErrorKind, &'static str> = table.into_iter().collect();
        for kind in ErrorKind::all() {
            if !templates.contains_key(&kind) {
                bail!(
                    "locale '{language}' has no message template for '{}'",
                    kind.code()
                );
            }
        }
        Ok(Self { header, templates })
    }

    /// Header line printed above the numbered report on the console.
    pub fn header(&self) -> &'static str {
        self.header
    }

    /// Resolve a finding to its localized message.
    pub fn resolve(&self, finding: &Finding) -> String {
        match self.templates.get(&finding.kind) {
            Some(template) => render_template(template, &finding.values),
            // Coverage is validated in `new`; fall back to the bare code.
            None => finding.kind.code(),
        }
    }
}

fn render_template(template: &str, values: &[(&'static str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

const RU_HEADER: &str = "Исправьте ошибки:";
const EN_HEADER: &str = "Fix the errors:";

fn ru_table() -> Vec<(ErrorKind, &'static str)> {
    let mut table = vec![
        (ErrorKind::StructureFile, "В проекте отсутствует файл {name}"),
        (
            ErrorKind::StructureDirectory,
            "В проекте отсутствует директория {name}",
        ),
        (
            ErrorKind::W3c,
            "Файл {fileName}, строка {line}: {message}",
        ),
        (
            ErrorKind::OrderStylesheetLinks,
            "Файлы стилей подключены в неверном порядке",
        ),
        (
            ErrorKind::AlternativeFonts,
            "Укажите альтернативные шрифты: {fonts}",
        ),
        (
            ErrorKind::BodyTagsMissing,
            "Внутри body не хватает элементов: {names}",
        ),
        (
            ErrorKind::BodyTagsExtra,
            "Внутри body есть лишние элементы: {names}",
        ),
        (
            ErrorKind::LangAttrMissing,
            "У элемента html нет атрибута lang со значением {lang}",
        ),
        (
            ErrorKind::TitleEmmet,
            "Поменяйте стандартный заголовок страницы (Document)",
        ),
        (ErrorKind::MetaTagsMissing, "Не хватает мета-тегов: {names}"),
        (ErrorKind::FaviconsMissing, "Не хватает фавиконок: {names}"),
        (
            ErrorKind::MobileFaviconMissing,
            "Не хватает фавиконки для мобильных устройств: {names}",
        ),
        (
            ErrorKind::ElementProperties,
            "У элемента {name} неверные значения свойств: {properties}",
        ),
        (
            ErrorKind::VideoAttributesMissing,
            "У элемента video не хватает атрибутов: {names}",
        ),
        (
            ErrorKind::VideoAttributesExtra,
            "У элемента video есть лишние атрибуты: {names}",
        ),
        (
            ErrorKind::CountPseudoElements,
            "Используйте псевдоклассы или псевдоэлементы (не менее трёх)",
        ),
        (
            ErrorKind::LayoutDifferent,
            "Вёрстка не совпадает с макетом",
        ),
    ];
    table.extend(LintRule::ALL.into_iter().map(|rule| {
        (
            ErrorKind::Stylelint(rule),
            "Файл {fileName}, строка {line}, колонка {column}: {text}",
        )
    }));
    table
}

fn en_table() -> Vec<(ErrorKind, &'static str)> {
    let mut table = vec![
        (ErrorKind::StructureFile, "The project is missing the file {name}"),
        (
            ErrorKind::StructureDirectory,
            "The project is missing the directory {name}",
        ),
        (ErrorKind::W3c, "File {fileName}, line {line}: {message}"),
        (
            ErrorKind::OrderStylesheetLinks,
            "The stylesheets are linked in the wrong order",
        ),
        (
            ErrorKind::AlternativeFonts,
            "Specify alternative fonts: {fonts}",
        ),
        (
            ErrorKind::BodyTagsMissing,
            "Elements missing inside body: {names}",
        ),
        (
            ErrorKind::BodyTagsExtra,
            "Unexpected elements inside body: {names}",
        ),
        (
            ErrorKind::LangAttrMissing,
            "The html element has no lang attribute containing {lang}",
        ),
        (
            ErrorKind::TitleEmmet,
            "Change the default page title (Document)",
        ),
        (ErrorKind::MetaTagsMissing, "Missing meta tags: {names}"),
        (ErrorKind::FaviconsMissing, "Missing favicons: {names}"),
        (
            ErrorKind::MobileFaviconMissing,
            "Missing mobile favicon: {names}",
        ),
        (
            ErrorKind::ElementProperties,
            "Element {name} has wrong property values: {properties}",
        ),
        (
            ErrorKind::VideoAttributesMissing,
            "The video element is missing attributes: {names}",
        ),
        (
            ErrorKind::VideoAttributesExtra,
            "The video element has unexpected attributes: {names}",
        ),
        (
            ErrorKind::CountPseudoElements,
            "Use pseudo-classes or pseudo-elements (at least three)",
        ),
        (
            ErrorKind::LayoutDifferent,
            "The layout does not match the reference design",
        ),
    ];
    table.extend(LintRule::ALL.into_iter().map(|rule| {
        (
            ErrorKind::Stylelint(rule),
            "File {fileName}, line {line}, column {column}: {text}",
        )
    }));
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_locales_cover_every_kind() {
        for language in ["ru", "en"] {
            Locale::new(language).expect("complete locale table");
        }
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        assert!(Locale::new("fr").is_err());
    }

    #[test]
    fn test_placeholder_substitution() {
        let locale = Locale::new("en").unwrap();
        let finding = Finding::new(ErrorKind::StructureFile).with("name", "style.css");
        assert_eq!(
            locale.resolve(&finding),
            "The project is missing the file style.css"
        );
    }

    #[test]
    fn test_render_numbers_findings_in_order() {
        let locale = Locale::new("en").unwrap();
        let report = Report::new(vec![
            Finding::new(ErrorKind::TitleEmmet),
            Finding::new(ErrorKind::LayoutDifferent),
        ]);
        let text = report.render(&locale);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. "));
        assert!(lines[1].starts_with("2. "));
        // The result artifact uses CRLF line separators.
        assert!(text.contains("\r\n"));
        assert!(!lines[0].ends_with('\r'));
    }

    #[test]
    fn test_lint_rule_codes_are_dotted() {
        assert_eq!(
            ErrorKind::Stylelint(LintRule::NoDuplicateSelectors).code(),
            "stylelint.no-duplicate-selectors"
        );
        assert_eq!(ErrorKind::StructureFile.code(), "structure.file");
    }
}
