use std::io::Write;

use tokio::io::{AsyncBufRead, Lines};

/// Print the prompt and read the next line. `None` at end of input.
pub async fn readline<R>(lines: &mut Lines<R>) -> Result<Option<String>, String>
where
    R: AsyncBufRead + Unpin,
{
    write!(std::io::stdout(), "$ ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    lines.next_line().await.map_err(|e| e.to_string())
}
