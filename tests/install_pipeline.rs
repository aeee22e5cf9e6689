//! End-to-end pipeline runs against shell-script stand-ins.
//!
//! `make` installs a fake `stalin` that "compiles" by writing a shell script
//! printing the greeting. Nothing here needs Docker, GCC or a real make.

#![cfg(unix)]

use stalin_installer::{
    install, FailureKind, InstallOptions, InstallProgress, InstallationRequest, PipelineState,
    SmokeTestStatus, SystemRunner, Tool,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const WORKING_MAKE: &str = r##"#!/bin/sh
set -e
for arg in "$@"; do
  case "$arg" in
    PREFIX=*) prefix="${arg#PREFIX=}" ;;
  esac
done
mkdir -p "$prefix/bin"
cat > "$prefix/bin/stalin" <<'EOF'
#!/bin/sh
out="${1%.sc}"
printf '#!/bin/sh\necho "Hello from Stalin!"\n' > "$out"
chmod +x "$out"
EOF
chmod +x "$prefix/bin/stalin"
echo "installed stalin into $prefix"
"##;

const BROKEN_COMPILER_MAKE: &str = r##"#!/bin/sh
set -e
for arg in "$@"; do
  case "$arg" in
    PREFIX=*) prefix="${arg#PREFIX=}" ;;
  esac
done
mkdir -p "$prefix/bin"
printf '#!/bin/sh\nexit 0\n' > "$prefix/bin/stalin"
chmod +x "$prefix/bin/stalin"
"##;

const FAILING_MAKE: &str = "#!/bin/sh\necho 'stalin.c:1: error: expected expression' >&2\nexit 2\n";

fn script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

struct Sandbox {
    src: TempDir,
    prefix: TempDir,
    tools: TempDir,
    scratch: TempDir,
}

impl Sandbox {
    fn new(make: &str) -> Self {
        Self::with_dirs(make, TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    /// Source and prefix as paths relative to the working directory.
    fn relative(make: &str) -> Self {
        let src = TempDir::new_in(".").unwrap();
        let prefix = TempDir::new_in(".").unwrap();
        assert!(src.path().is_relative());
        Self::with_dirs(make, src, prefix)
    }

    fn with_dirs(make: &str, src: TempDir, prefix: TempDir) -> Self {
        let sandbox = Self {
            src,
            prefix,
            tools: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        };
        let src = sandbox.src.path();
        fs::create_dir(src.join("benchmarks")).unwrap();
        fs::write(src.join("benchmarks/boyer.sc"), "(define (boyer) #t)").unwrap();
        fs::write(src.join("README.md"), "# Stalin\n").unwrap();
        fs::write(src.join("DEVELOPMENT.md"), "# Development\n").unwrap();
        script(&src.join("docker-build.sh"), "#!/bin/sh\necho 'image ready'\n");
        script(&sandbox.tools.path().join("make"), make);
        sandbox
    }

    fn request(&self) -> InstallationRequest {
        let tools = Tool::default_names().into_iter().map(|name| (name, true));
        InstallationRequest::new(self.src.path(), self.prefix.path())
            .with_tool_availability(tools.collect())
    }

    fn options(&self) -> InstallOptions {
        InstallOptions {
            build_program: self.tools.path().join("make").display().to_string(),
            scratch_dir: Some(self.scratch.path().to_path_buf()),
            ..Default::default()
        }
    }

    fn prefix(&self, relative: &str) -> PathBuf {
        self.prefix.path().join(relative)
    }
}

#[tokio::test]
async fn test_full_install() {
    let sandbox = Sandbox::new(WORKING_MAKE);
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = states.clone();

    let report = install(
        &sandbox.request(),
        &sandbox.options(),
        &SystemRunner::new(),
        &CancellationToken::new(),
        move |progress| {
            if let InstallProgress::StateChanged { to, .. } = progress {
                sink.lock().unwrap().push(to);
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(report.smoke_test, SmokeTestStatus::Passed);
    assert_eq!(report.binary, sandbox.prefix("bin/stalin"));
    assert!(sandbox.prefix("share/stalin/examples/boyer.sc").is_file());
    assert!(sandbox.prefix("share/doc/stalin/README.md").is_file());
    assert!(sandbox.prefix("share/doc/stalin/DEVELOPMENT.md").is_file());
    assert!(sandbox.scratch.path().join("test").is_file());
    assert!(report.message.contains("share/stalin/examples/"));
    assert_eq!(
        states.lock().unwrap().last(),
        Some(&PipelineState::Reported)
    );
}

#[tokio::test]
async fn test_relative_source_and_prefix() {
    let sandbox = Sandbox::relative(WORKING_MAKE);
    let cwd = std::env::current_dir().unwrap();

    let report = install(
        &sandbox.request(),
        &sandbox.options(),
        &SystemRunner::new(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.smoke_test, SmokeTestStatus::Passed);
    assert_eq!(report.binary, cwd.join(sandbox.prefix("bin/stalin")));
    assert!(sandbox.prefix("bin/stalin").is_file());
    assert!(sandbox.prefix("share/stalin/examples/boyer.sc").is_file());
    assert!(!sandbox.src.path().join(sandbox.prefix.path()).exists());
}

#[tokio::test]
async fn test_provisioning_failure_stops_before_build() {
    let sandbox = Sandbox::new(WORKING_MAKE);
    script(
        &sandbox.src.path().join("docker-build.sh"),
        "#!/bin/sh\necho 'Cannot connect to the Docker daemon' >&2\nexit 1\n",
    );

    let err = install(
        &sandbox.request(),
        &sandbox.options(),
        &SystemRunner::new(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Provisioning);
    assert!(err.stderr().unwrap_or_default().contains("Docker daemon"));
    assert!(!sandbox.prefix("bin").exists());
    assert!(!sandbox.prefix("share").exists());
}

#[tokio::test]
async fn test_build_failure_leaves_share_untouched() {
    let sandbox = Sandbox::new(FAILING_MAKE);

    let err = install(
        &sandbox.request(),
        &sandbox.options(),
        &SystemRunner::new(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Build);
    assert!(err.stderr().unwrap_or_default().contains("expected expression"));
    assert!(!sandbox.prefix("share").exists());
}

#[tokio::test]
async fn test_broken_compiler_is_verification_failure() {
    let sandbox = Sandbox::new(BROKEN_COMPILER_MAKE);
    // Left over from an earlier successful run in the same scratch dir.
    script(
        &sandbox.scratch.path().join("test"),
        "#!/bin/sh\necho 'Hello from Stalin!'\n",
    );

    let err = install(
        &sandbox.request(),
        &sandbox.options(),
        &SystemRunner::new(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Verification);
    assert!(sandbox.prefix("bin/stalin").is_file());
    assert!(sandbox.prefix("share/stalin/examples/boyer.sc").is_file());
    assert!(!sandbox.scratch.path().join("test").exists());
}
