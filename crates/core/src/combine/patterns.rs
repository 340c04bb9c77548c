//! Text classification patterns used by the cross-page decision.

use std::sync::LazyLock;

use regex::Regex;

static PAGE_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(^[0-9]{1,4}$)",
        r"|(^第[0-9]{1,4}页)",
        r"|([0-9]{1,4}/[0-9]{1,4}$)",
        r"|(^(i|ii|iii|iv|v|vi|vii|viii|ix|I|II|III|IV|V|VI|VII|VIII|IX|Ⅰ|Ⅱ|Ⅲ|Ⅳ|Ⅴ|Ⅵ|Ⅶ|Ⅷ|Ⅸ)$)",
        r"|(^(-|–|—)\s*[0-9]{1,4}\s*(-|–|—)$)",
        r"|(^1-1-[0-9]{1,4}$)",
        r"|(^[0-9]{1,4}((-|–|—)\s*[0-9]{1,4})+$)",
    ))
    .unwrap()
});

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"注[:：]").unwrap());

static CONTINUED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)续[表)）]*$").unwrap());

static TABLE_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+表$").unwrap());

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^[-+]?[0-9]+(,[0-9]{3})*(\.[0-9]+)?%?$)|(^\s+$)").unwrap()
});

static UNIT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"单位[：:]").unwrap());

static INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([0-9]|零|一|二|三|四|五|六|七|八|九|十",
        r"|i|ii|iii|iv|v|vi|vii|viii|ix|x|I|II|III|IV|V|VI|VII|VIII|IX|X",
        r"|Ⅰ|Ⅱ|Ⅲ|Ⅳ|Ⅴ|Ⅵ|Ⅶ|Ⅷ|Ⅸ|Ⅹ|([0-9]{1,3}(\.[0-9]{1,3})+))$",
    ))
    .unwrap()
});

static DOTTED_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{1,3})+").unwrap());

static BRACKETED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[(（][0-9]{1,3}[)）]").unwrap());

static NO_MERGE_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^((序号)|(议案))$").unwrap());

/// Punctuation considered when looking at cell seams.
pub const CHINESE_PUNCTUATIONS: &str = ",，。?？;；、:：“”\"(（)）[]【】{}!！<>《》";

/// Characters that may not precede 续 in a continuation title.
const CONTINUATION_EXCLUDED: &str = "手持延后接继永";

const SECTION_NUMERALS: &str = "〇一二三四五六七八九十";

pub fn is_page_footer(text: &str) -> bool {
    PAGE_FOOTER.is_match(text)
}

pub fn is_comment(text: &str) -> bool {
    COMMENT.is_match(text)
}

/// Titles like "资产负债表（续）" that announce a continued table.
pub fn is_continued_title(text: &str) -> bool {
    let Some(caps) = CONTINUED_TITLE.captures(text) else {
        return false;
    };
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let prefix = prefix
        .strip_suffix('(')
        .or_else(|| prefix.strip_suffix('（'))
        .unwrap_or(prefix);
    prefix
        .chars()
        .next_back()
        .is_none_or(|c| !CONTINUATION_EXCLUDED.contains(c))
}

pub fn is_table_title(text: &str) -> bool {
    TABLE_TITLE.is_match(text)
}

/// Plain numbers, optionally signed, grouped or a percentage. Blank text
/// made of whitespace counts too.
pub fn is_number(text: &str) -> bool {
    NUMBER.is_match(text)
}

pub fn is_unit_statement(text: &str) -> bool {
    UNIT_STATEMENT.is_match(text)
}

/// Row indexes: a digit, a Chinese or Roman numeral, or a dotted number.
pub fn is_index(text: &str) -> bool {
    INDEX.is_match(text)
}

pub fn is_no_merge_header(text: &str) -> bool {
    NO_MERGE_HEADER.is_match(text)
}

fn is_section_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SECTION_NUMERALS.contains(c)
}

/// Whether text opens with a section number such as "1、", "（三）", "A."
/// or "2.1".
///
/// A leading run of up to three numerals or letters only counts when some
/// cut of it is not directly followed by a digit, so "2016" has no prefix
/// while "12.5" and "ABCD" do.
pub fn has_numeric_section_prefix(text: &str) -> bool {
    if DOTTED_SECTION.is_match(text) {
        return true;
    }
    if let Some(m) = BRACKETED_NUMBER.find(text)
        && !text[m.end()..].starts_with(|c: char| c.is_ascii_digit())
    {
        return true;
    }

    let rest = text.trim_start();
    let rest = rest
        .strip_prefix('(')
        .or_else(|| rest.strip_prefix('（'))
        .unwrap_or(rest);
    let chars: Vec<char> = rest.chars().collect();
    let run = chars.iter().take(3).take_while(|c| is_section_char(**c)).count();
    if run == 0 {
        return false;
    }
    let inner_letter = chars[1..run].iter().any(|c| !c.is_ascii_digit());
    let followed_by_digit = chars.get(run).is_some_and(|c| c.is_ascii_digit());
    inner_letter || !followed_by_digit
}

/// The punctuation characters of `text`, in order.
pub fn punctuations(text: &str) -> String {
    text.chars().filter(|c| CHINESE_PUNCTUATIONS.contains(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_footer() {
        assert!(is_page_footer("12"));
        assert!(is_page_footer("第3页"));
        assert!(is_page_footer("3/120"));
        assert!(is_page_footer("- 12 -"));
        assert!(is_page_footer("1-1-45"));
        assert!(is_page_footer("iv"));
        assert!(!is_page_footer("vivid"));
        assert!(!is_page_footer("注：单位为元"));
    }

    #[test]
    fn test_continued_title() {
        assert!(is_continued_title("资产负债表（续）"));
        assert!(is_continued_title("附表续表"));
        assert!(!is_continued_title("续表"));
        assert!(is_continued_title("合并利润表续"));
        assert!(!is_continued_title("持续"));
        assert!(!is_continued_title("业务后续"));
        assert!(!is_continued_title("续表说明"));
    }

    #[test]
    fn test_numbers_and_indexes() {
        assert!(is_number("1,234.50"));
        assert!(is_number("-12%"));
        assert!(is_number("  "));
        assert!(!is_number("12a"));
        assert!(!is_number(""));
        assert!(is_index("三"));
        assert!(is_index("1.2.3"));
        assert!(!is_index("12"));
    }

    #[test]
    fn test_numeric_section_prefix() {
        assert!(has_numeric_section_prefix("1、营业收入"));
        assert!(has_numeric_section_prefix("（三）其他"));
        assert!(has_numeric_section_prefix("2.1 概况"));
        assert!(has_numeric_section_prefix("(12)"));
        assert!(has_numeric_section_prefix("ABCD"));
        assert!(has_numeric_section_prefix("12.5"));
        assert!(!has_numeric_section_prefix("2016"));
        assert!(!has_numeric_section_prefix("营业收入"));
        assert!(!has_numeric_section_prefix(""));
    }

    #[test]
    fn test_misc_patterns() {
        assert!(is_unit_statement("单位：万元"));
        assert!(is_comment("注：以上数据未经审计"));
        assert!(is_table_title("合并资产负债表"));
        assert!(is_no_merge_header("序号"));
        assert!(!is_no_merge_header("序号1"));
        assert_eq!(punctuations("营业（收入），合计。"), "（），。");
    }
}
