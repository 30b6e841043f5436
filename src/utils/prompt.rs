//! 终端交互

use anyhow::{bail, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// 打印提示并读取一行（去掉首尾空白）
pub async fn prompt_line(question: &str) -> Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    let read = BufReader::new(io::stdin()).read_line(&mut line).await?;
    if read == 0 {
        bail!("标准输入已关闭");
    }
    Ok(line.trim().to_string())
}

/// 解析 yes / no 回答
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "yes" | "y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("yes"));
        assert!(is_yes(" YES "));
        assert!(is_yes("y"));
        assert!(!is_yes("no"));
        assert!(!is_yes(""));
        assert!(!is_yes("yess"));
    }
}
