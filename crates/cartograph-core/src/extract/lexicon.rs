//! Fixed lexicons backing the rule-based extraction rules.

/// The hundred most common Chinese surnames. A multi-character token whose
/// first character appears here is treated as a person name candidate.
pub(crate) const CHINESE_SURNAMES: &str = "王李张刘陈杨赵黄周吴徐孙胡朱高林何郭马罗梁宋郑谢韩唐冯于董萧程曹袁邓许傅沈曾彭吕苏卢蒋蔡贾丁魏薛叶阎余潘杜戴夏钟汪田任姜范方石姚谭廖邹熊金陆郝孔白崔康毛邱秦江史顾侯邵孟龙万段雷钱汤尹黎易常武乔贺赖龚文";

/// Suffixes that mark a token as an organization name.
pub(crate) const ORG_KEYWORDS: &[&str] = &[
    "公司", "大学", "学院", "研究院", "集团", "企业", "机构", "部门", "政府", "银行",
];

/// Suffixes that mark a token as a geopolitical or location name.
pub(crate) const LOCATION_KEYWORDS: &[&str] = &["市", "省", "县", "区", "街", "路", "国", "州"];
