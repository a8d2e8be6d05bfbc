use crate::routes::ExecutionResult;

use super::StageOutput;

/// Merge the engine's compile and run stages into one uniform report.
///
/// A non-empty compile stderr fails the whole execution regardless of the
/// run stage, and any run stderr at all fails it even when the exit code is
/// zero. Both channels are trimmed of surrounding whitespace on the way out.
pub fn normalize(compile: Option<StageOutput>, run: Option<StageOutput>) -> ExecutionResult {
    let mut output = String::new();
    let mut error = String::new();

    if let Some(compile) = &compile {
        if !compile.stderr.is_empty() {
            error.push_str("[Compilation Error]\n");
            error.push_str(&compile.stderr);
            error.push('\n');
        }
        if !compile.stdout.is_empty() {
            output.push_str("[Compilation Output]\n");
            output.push_str(&compile.stdout);
            output.push('\n');
        }
    }

    if let Some(run) = run {
        output.push_str(&run.stdout);
        error.push_str(&run.stderr);

        let exit_code = run.code.unwrap_or(0);
        return ExecutionResult {
            success: exit_code == 0 && error.is_empty(),
            stdout: output.trim().to_string(),
            stderr: error.trim().to_string(),
            exit_code,
            signal: run.signal,
        };
    }

    // Compile-only outcome: success derives from the compile stage's own
    // exit code plus the channel contents.
    let exit_code = compile.as_ref().and_then(|c| c.code).unwrap_or(0);
    ExecutionResult {
        success: exit_code == 0 && error.is_empty(),
        stdout: output.trim().to_string(),
        stderr: error.trim().to_string(),
        exit_code,
        signal: None,
    }
}
