//! CLI 分发：`run [--seed]`、`hash-password`、`version`。

use anyhow::anyhow;

use crate::auth::password;

/// CLI 分发结果。
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CliDispatch {
    /// 进入服务主循环；`seed` 为真时先写入演示账户。
    Run { seed: bool },
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    let Some(cmd) = args.first().map(|raw| raw.trim()) else {
        return Ok(CliDispatch::Run { seed: false });
    };

    match cmd {
        "" => Ok(CliDispatch::Run { seed: false }),
        "--seed" => run_flags(&args[1..], true),
        "run" => run_flags(&args[1..], false),
        "-h" | "--help" | "help" => {
            print_root_help();
            Ok(CliDispatch::Exit)
        }
        "hash-password" => {
            let plaintext = args
                .get(1)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("usage: ag-api hash-password <plaintext>"))?;
            println!("{}", password::derive(plaintext)?);
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `ag-api --help` for usage"
        )),
    }
}

/// 解析 `run` 之后的参数，目前只有 `--seed`。
fn run_flags(rest: &[String], mut seed: bool) -> anyhow::Result<CliDispatch> {
    for flag in rest {
        match flag.as_str() {
            "--seed" => seed = true,
            other => return Err(anyhow!("unknown flag: {other}; usage: ag-api run [--seed]")),
        }
    }
    Ok(CliDispatch::Run { seed })
}

/// 打印 root help。
fn print_root_help() {
    println!("ag-api usage:");
    println!("  ag-api run [--seed]");
    println!("  ag-api --seed");
    println!("  ag-api hash-password <plaintext>");
    println!("  ag-api version");
}

#[cfg(test)]
mod tests {
    use super::{CliDispatch, dispatch};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn run_is_default_and_seed_is_optional() {
        assert_eq!(dispatch(&[]).unwrap(), CliDispatch::Run { seed: false });
        assert_eq!(
            dispatch(&args(&["run"])).unwrap(),
            CliDispatch::Run { seed: false }
        );
        assert_eq!(
            dispatch(&args(&["run", "--seed"])).unwrap(),
            CliDispatch::Run { seed: true }
        );
        assert_eq!(
            dispatch(&args(&["--seed"])).unwrap(),
            CliDispatch::Run { seed: true }
        );
    }

    #[test]
    fn unknown_commands_and_flags_fail() {
        assert!(dispatch(&args(&["serve"])).is_err());
        assert!(dispatch(&args(&["run", "--fast"])).is_err());
        assert!(dispatch(&args(&["hash-password"])).is_err());
    }
}
