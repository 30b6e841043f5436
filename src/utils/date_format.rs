//! 查询日期解析

use chrono::NaiveDate;

use crate::error::CatalogError;

/// 接受的输入格式（单个数字的月 / 日也可以）
const INPUT_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

/// 解析后的查询日期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupDate(NaiveDate);

impl LookupDate {
    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let trimmed = input.trim();
        INPUT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(LookupDate)
            .ok_or_else(|| CatalogError::InvalidDate {
                input: input.to_string(),
            })
    }

    /// 输入框中使用的格式 `MM/DD/YYYY`
    pub fn query_value(&self) -> String {
        self.0.format("%m/%d/%Y").to_string()
    }

    /// 输出文件名使用的格式 `YYYY_MM_DD`
    pub fn file_stem(&self) -> String {
        self.0.format("%Y_%m_%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_formats() {
        for input in [
            "2024-01-16",
            "2024/01/16",
            "01/16/2024",
            "01-16-2024",
            "1/16/2024",
            " 2024-1-16 ",
        ] {
            let date = LookupDate::parse(input).unwrap();
            assert_eq!(date.query_value(), "01/16/2024", "input: {}", input);
            assert_eq!(date.file_stem(), "2024_01_16", "input: {}", input);
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            LookupDate::parse("next tuesday"),
            Err(CatalogError::InvalidDate { .. })
        ));
        assert!(LookupDate::parse("2024-13-40").is_err());
        assert!(LookupDate::parse("").is_err());
    }
}
