use crate::cli::TailArgs;
use crate::commands::output::OutputFormatter;
use crate::commands::parse::matches_filters;
use crate::KubernetesParser;
use chrono::Utc;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::thread;
use std::time::Duration;

pub fn run_tail(args: TailArgs, parser: &KubernetesParser) -> Result<(), Box<dyn std::error::Error>> {
    let levels: Option<Vec<String>> = args
        .level
        .as_ref()
        .map(|lvls| lvls.iter().map(|l| l.to_lowercase()).collect());
    let no_fields = HashMap::new();

    let print_line = |line: &str| {
        let parsed = parser.parse(line);
        if parsed.is_empty() || !matches_filters(&parsed, &levels, &no_fields) {
            return;
        }
        // Each followed line gets its own fallback clock reading
        let formatter = OutputFormatter::new(args.output, Utc::now());
        println!("{}", formatter.format_line(line, &parsed));
    };

    let mut file = File::open(&args.file)?;
    for line in read_last_n_lines(&mut file, args.lines)? {
        print_line(&line);
    }

    if args.follow {
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::End(0))?;
        tracing::info!(file = %args.file.display(), "following");

        let mut pending = String::new();
        loop {
            match reader.read_line(&mut pending) {
                Ok(0) => {
                    thread::sleep(Duration::from_millis(100));
                }
                Ok(_) => match take_complete_line(&mut pending) {
                    Some(line) => print_line(&line),
                    // The writer is mid-line; wait for the rest
                    None => thread::sleep(Duration::from_millis(100)),
                },
                Err(e) => {
                    tracing::error!(error = %e, "error reading file");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Take the buffered line once its `\n` has arrived, without the terminator
fn take_complete_line(pending: &mut String) -> Option<String> {
    if !pending.ends_with('\n') {
        return None;
    }
    let line = pending.trim_end_matches(['\n', '\r']).to_string();
    pending.clear();
    Some(line)
}

/// Read the last `n` lines of `file`, scanning backwards in chunks
pub fn read_last_n_lines(file: &mut File, n: usize) -> Result<Vec<String>, std::io::Error> {
    let file_size = file.metadata()?.len();
    if file_size == 0 || n == 0 {
        return Ok(Vec::new());
    }

    let chunk_size = 8192u64;
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut pos = file_size;

    // One extra line so a partial first line is never counted
    while lines.len() <= n && pos > 0 {
        let read_size = std::cmp::min(chunk_size, pos);
        pos -= read_size;
        file.seek(SeekFrom::Start(pos))?;

        let mut chunk = vec![0u8; read_size as usize];
        file.read_exact(&mut chunk)?;

        chunk.append(&mut buffer);
        buffer = chunk;

        lines = String::from_utf8_lossy(&buffer)
            .lines()
            .map(|s| s.to_string())
            .collect();
    }

    let start = lines.len().saturating_sub(n);
    Ok(lines.split_off(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut pending = String::from("I0524 16:21:12.823864 1025 log.go:195] half");
        assert_eq!(take_complete_line(&mut pending), None);
        assert_eq!(pending, "I0524 16:21:12.823864 1025 log.go:195] half");

        pending.push_str(" written\r\n");
        assert_eq!(
            take_complete_line(&mut pending).as_deref(),
            Some("I0524 16:21:12.823864 1025 log.go:195] half written")
        );
        assert!(pending.is_empty());
        assert_eq!(take_complete_line(&mut pending), None);
    }

    #[test]
    fn test_follow_reads_reassemble_split_line() {
        let path = std::env::temp_dir().join(format!("kubeparse-follow-{}.log", std::process::id()));
        let mut out = File::create(&path).unwrap();
        let mut reader = BufReader::new(File::open(&path).unwrap());
        let mut pending = String::new();

        write!(out, "level=info msg=\"par").unwrap();
        out.flush().unwrap();
        reader.read_line(&mut pending).unwrap();
        assert_eq!(take_complete_line(&mut pending), None);

        writeln!(out, "tial\"").unwrap();
        out.flush().unwrap();
        reader.read_line(&mut pending).unwrap();
        let line = take_complete_line(&mut pending);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(line.as_deref(), Some("level=info msg=\"partial\""));
    }

    #[test]
    fn test_read_last_n_lines() {
        let path = std::env::temp_dir().join(format!("kubeparse-tail-{}.log", std::process::id()));
        {
            let mut out = File::create(&path).unwrap();
            for i in 0..5000 {
                writeln!(out, "I0524 16:21:12.823864 1025 log.go:{}] line {}", i, i).unwrap();
            }
        }

        let mut file = File::open(&path).unwrap();
        let lines = read_last_n_lines(&mut file, 3).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 4997"));
        assert!(lines[2].ends_with("line 4999"));
    }
}
