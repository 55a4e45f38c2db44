// bodge: A minimal build-description tool for C and C++ projects.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//
// For inquiries, you can contact us via e-mail at jichuruanjian@idea.edu.cn.

use super::*;
use expect_test::expect;

#[test]
fn test_build_all_dry_run() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(&dir, ["build", "--dry-run", "--platform", "linux_x64"]),
        expect![[r#"
            g++ -O2 -DLINUX64 -m64 -pthread -Iinclude src/core/math.cpp src/core/vec.cpp -o libcore.a
            g++ -O2 -DLINUX64 -Wall -m64 -pthread -Iinclude src/main.cpp -o app -L. -lcore
            g++ -O2 -DLINUX64 -m64 -pthread -shared -fPIC -Iinclude plugin/p.cpp plugin/sub/q.cc -o plugin.so
        "#]],
    );
    // nothing was compiled
    assert!(!dir.join("app").exists());
}

#[test]
fn test_no_subcommand_builds_everything() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(&dir, ["--dry-run", "--platform", "windows_x64"]),
        expect![[r#"
            g++ -O2 -m64 -static-libgcc -static-libstdc++ -Iinclude src/core/math.cpp src/core/vec.cpp -o libcore.lib -lws2_32
            g++ -O2 -Wall -m64 -static-libgcc -static-libstdc++ -Iinclude src/main.cpp -o app_win.exe -L. -lws2_32 -lcore
        "#]],
    );
}

#[test]
fn test_arch_flag_replaces_the_arch() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(
            &dir,
            ["build", "app", "--dry-run", "--platform", "windows_x64", "--arch", "x86"],
        ),
        expect![[r#"
            g++ -O2 -Wall -m32 -static-libgcc -static-libstdc++ -Iinclude src/main.cpp -o app_win.exe -L. -lws2_32 -lcore
        "#]],
    );
}

#[test]
fn test_build_single_target() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(&dir, ["build", "app", "--dry-run", "--platform", "linux_x64"]),
        expect![[r#"
            g++ -O2 -DLINUX64 -Wall -m64 -pthread -Iinclude src/main.cpp -o app -L. -lcore
        "#]],
    );
}

#[test]
fn test_build_skips_unlisted_platform() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(&dir, ["build", "plugin", "--dry-run", "--platform", "windows_x64"]),
        expect![""],
    );
    let stderr = get_stderr(&dir, ["build", "plugin", "--dry-run", "--platform", "windows_x64"]);
    assert!(stderr.contains("Skipping target 'plugin': not configured for platform windows_x64"));
}

#[test]
fn test_build_unknown_target() {
    let dir = TestDir::new("multi_target");
    let stderr = get_err_stderr(&dir, ["build", "nope", "--dry-run"]);
    assert!(stderr.contains("target `nope` not found"));
}

#[test]
fn test_quiet_hides_progress() {
    let dir = TestDir::new("multi_target");
    let stderr = get_stderr(
        &dir,
        ["build", "app", "--dry-run", "-q", "--platform", "linux_x64"],
    );
    check(stderr, expect![""]);
}

#[test]
fn test_directory_flag() {
    let dir = TestDir::new_empty();
    let project = TestDir::new("multi_target");
    let out = get_stdout(
        &dir,
        [
            "-C",
            project.as_ref().to_str().unwrap(),
            "build",
            "core",
            "--dry-run",
            "--platform",
            "linux_x64",
        ],
    );
    check(
        out,
        expect![[r#"
            g++ -O2 -DLINUX64 -m64 -pthread -Iinclude src/core/math.cpp src/core/vec.cpp -o libcore.a
        "#]],
    );
}

#[test]
fn test_legacy_project_file() {
    let dir = TestDir::new("legacy");
    check(
        get_stdout(&dir, ["--dry-run", "--platform", "windows_x86"]),
        expect![[r#"
            g++ -g -m32 -static-libgcc -static-libstdc++ hello.cpp -o hello.exe
        "#]],
    );
}

#[test]
fn test_config_flag_selects_project_file() {
    let dir = TestDir::new("legacy");
    check(
        get_stdout(
            &dir,
            ["--config", "alt.bodge", "--dry-run", "--platform", "linux_x64"],
        ),
        expect![[r#"
            g++ -g -m64 -pthread hello.cpp -o hello_alt
        "#]],
    );
    let stderr = get_err_stderr(&dir, ["--config", "nope.bodge", "build"]);
    assert!(stderr.contains("failed to load `$ROOT/nope.bodge`"));
}

#[test]
fn test_unsafe_flags_fail_the_build() {
    let dir = TestDir::new("unsafe_flags");
    let stdout = get_err_stdout(&dir, ["build", "--dry-run", "--platform", "linux_x64"]);
    check(stdout, expect![""]);
    let stderr = get_err_stderr(&dir, ["build", "--dry-run", "--platform", "linux_x64"]);
    assert!(stderr.contains("unsafe characters in cxx_flags: `-O2;rm -rf /`"));
    assert!(stderr.contains("app (linux_x64)"));
}

#[test]
fn test_unsafe_source_pattern_fails_the_build() {
    let dir = TestDir::new("unsafe_sources");
    let stdout = get_err_stdout(&dir, ["build", "--dry-run", "--platform", "linux_x64"]);
    check(stdout, expect![""]);
    let stderr = get_err_stderr(&dir, ["build", "app", "--dry-run", "--platform", "linux_x64"]);
    assert!(stderr.contains("unsafe characters in sources: `a.cpp; rm -rf /`"));
}

#[test]
fn test_include_cycle_keeps_input_order() {
    let dir = TestDir::new("include_cycle");
    check(
        get_stdout(&dir, ["build", "--dry-run", "--platform", "linux_arm64"]),
        expect![[r#"
            g++ -pthread a.cpp b.cpp -o app
        "#]],
    );
    let stderr = get_stderr(&dir, ["build", "--dry-run", "--platform", "linux_arm64"]);
    assert!(stderr.contains("include cycle between a.cpp, b.cpp, keeping input order"));
}

#[test]
fn test_missing_project_file() {
    let dir = TestDir::new_empty();
    let stderr = get_err_stderr(&dir, ["build"]);
    assert!(stderr.contains("no usable project file in `$ROOT`"));
    assert!(stderr.contains("failed to load `$ROOT/.bodge`"));
}

#[test]
fn test_project_without_targets() {
    let dir = TestDir::new("no_targets");
    let stderr = get_err_stderr(&dir, ["build", "--dry-run"]);
    assert!(stderr.contains("no build targets defined"));
    let stderr = get_err_stderr(&dir, ["list"]);
    assert!(stderr.contains("no build targets defined"));
}

#[test]
fn test_list() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(&dir, ["list", "--platform", "linux_x64"]),
        expect![[r#"
            project: demo
            compiler: g++
            default platforms: (host)
            targets:
              core (static) platforms: all
              app (exe) platforms: all
              plugin (shared) platforms: linux_x64
            sequences:
              dist (3 operations)
              stage (3 operations)

            resolved for linux_x64:
              core -> libcore.a
                sources: src/core/math.cpp src/core/vec.cpp
                cxx_flags: -O2 -DLINUX64 -m64 -pthread
                include_dirs: include
                library_dirs:
                libraries:
              app -> app
                sources: src/main.cpp
                cxx_flags: -O2 -DLINUX64 -Wall -m64 -pthread
                include_dirs: include
                library_dirs: .
                libraries: core
              plugin -> plugin.so
                sources: plugin/p.cpp plugin/sub/q.cc
                cxx_flags: -O2 -DLINUX64 -m64 -pthread
                include_dirs: include
                library_dirs:
                libraries:
        "#]],
    );
}

#[test]
fn test_list_json() {
    let dir = TestDir::new("multi_target");
    let out = get_stdout(&dir, ["list", "--json", "--platform", "windows_x64"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["name"], "demo");
    assert_eq!(json["platform"], "windows_x64");
    assert_eq!(json["targets"].as_array().unwrap().len(), 3);
    assert_eq!(json["targets"][2]["target_platforms"][0], "linux_x64");

    let builds = json["builds"].as_array().unwrap();
    let outputs: Vec<&str> = builds.iter().map(|b| b["output"].as_str().unwrap()).collect();
    assert_eq!(outputs, ["libcore.lib", "app_win.exe"]);
    assert_eq!(
        builds[1]["command"],
        "g++ -O2 -Wall -m64 -static-libgcc -static-libstdc++ -Iinclude src/main.cpp -o app_win.exe -L. -lws2_32 -lcore"
    );

    let dist = &json["sequences"][0];
    assert_eq!(dist["name"], "dist");
    assert_eq!(dist["operations"][2]["kind"], "copy");
    assert_eq!(dist["operations"][2]["destination"], "dist/app");
    assert!(json["errors"].as_array().unwrap().is_empty());
}

#[test]
fn test_sequence_dry_run() {
    let dir = TestDir::new("multi_target");
    check(
        get_stdout(
            &dir,
            ["sequence", "dist", "--dry-run", "--platform", "linux_x64"],
        ),
        expect![[r#"
            g++ -O2 -DLINUX64 -Wall -m64 -pthread -Iinclude src/main.cpp -o app -L. -lcore
            mkdir dist
            copy app -> dist/app
        "#]],
    );
    assert!(!dir.join("dist").exists());
}

#[test]
fn test_sequence_file_operations() {
    let dir = TestDir::new("multi_target");
    std::fs::create_dir_all(dir.join("out/stale")).unwrap();
    bodge_cmd(&dir, ["sequence", "stage"]).assert().success();
    assert!(!dir.join("out/stale").exists());
    assert_eq!(
        std::fs::read_to_string(dir.join("out/doc/README")).unwrap(),
        "demo\n"
    );
}

#[test]
fn test_sequence_failure_names_the_step() {
    let dir = TestDir::new("multi_target");
    std::fs::write(
        dir.join(".bodge"),
        "app.sources: src/main.cpp\nsequence.dist: mkdir:dist copy:app->dist/app\n",
    )
    .unwrap();
    // `app` was never built, so the copy fails
    let stderr = get_err_stderr(&dir, ["sequence", "dist"]);
    assert!(stderr.contains("sequence `dist` failed at step 2 (copy app -> dist/app)"));
    assert!(dir.join("dist").is_dir());
}

#[test]
fn test_unknown_sequence() {
    let dir = TestDir::new("multi_target");
    let stderr = get_err_stderr(&dir, ["sequence", "nope"]);
    assert!(stderr.contains("sequence `nope` not found"));
}

#[test]
fn test_fetch_without_dependencies() {
    let dir = TestDir::new("multi_target");
    let stderr = get_stderr(&dir, ["fetch"]);
    assert!(stderr.contains("No dependencies to fetch"));
}

#[test]
fn test_fetch_dry_run() {
    let dir = TestDir::new("multi_target");
    let mut text = std::fs::read_to_string(dir.join(".bodge")).unwrap();
    text.push_str("dependencies_url: https://example.com/fmt.git\n");
    text.push_str("dependencies_path: deps/fmt\n");
    std::fs::write(dir.join(".bodge"), text).unwrap();
    let out = get_stdout(&dir, ["fetch", "--dry-run"]);
    check(
        out,
        expect![[r#"
            git clone https://example.com/fmt.git $ROOT/deps/fmt
        "#]],
    );
}

#[test]
fn test_fetch_mismatched_lists() {
    let dir = TestDir::new("multi_target");
    let mut text = std::fs::read_to_string(dir.join(".bodge")).unwrap();
    text.push_str("dependencies_url: https://example.com/a.git, https://example.com/b.git\n");
    text.push_str("dependencies_path: deps/a\n");
    std::fs::write(dir.join(".bodge"), text).unwrap();
    let stderr = get_err_stderr(&dir, ["fetch", "--dry-run"]);
    assert!(stderr.contains("2 dependency url(s) but 1 dependency path(s)"));
    // a single target build does not need the dependencies
    get_stdout(&dir, ["build", "app", "--dry-run"]);
}

#[test]
fn test_platform() {
    let dir = TestDir::new_empty();
    let out = get_stdout(&dir, ["platform", "--platform", "apple_arm64"]);
    assert!(out.starts_with("host os: "));
    assert!(out.contains("selected platform: apple_arm64\n"));
    assert!(out.contains("supported platforms:\n"));
    for p in ["windows_x86", "linux_x64", "unix_arm", "apple_arm64"] {
        assert!(out.contains(&format!("\n  {}\n", p)), "missing {p}");
    }
}

#[test]
fn test_version() {
    let dir = TestDir::new_empty();
    check(
        get_stdout(&dir, ["version"]),
        expect![[r#"
            bodge 0.1.0
        "#]],
    );
}

#[test]
fn test_watch_rejects_bad_arguments() {
    let dir = TestDir::new("multi_target");
    bodge_cmd(&dir, ["watch", "--interval", "50"])
        .assert()
        .failure();
    let stderr = get_err_stderr(&dir, ["watch", "--log", "../escape.log"]);
    assert!(stderr.contains("must not contain `..`"));
    assert!(!dir.join("bodge_daemon.log").exists());
}
