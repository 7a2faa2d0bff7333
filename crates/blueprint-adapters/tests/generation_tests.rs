//! End-to-end generation over a real blueprint directory.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use blueprint_adapters::{
    LocalFilesystem, LocalRepository, MemoryFilesystem, PlaceholderRenderer,
    functions::OsProvider, load_answers,
};
use blueprint_core::{
    application::{
        AnswerValidator, ApplicationError, BlueprintService, GenerateRequest, InputSource,
        PipelineConfig,
    },
    domain::{PreparedData, ResolvedOption, Value, Variable},
    error::{BlueprintError, BlueprintResult},
    functions::FunctionRegistry,
};

// ============================================================================
// Fixtures
// ============================================================================

const ROOT_BLUEPRINT: &str = r#"
apiVersion: xl/v2
kind: Blueprint
metadata:
  name: web-app
spec:
  parameters:
    - name: AppName
      type: Input
      prompt: Application name?
      saveInXlvals: true
    - name: DbPassword
      type: SecretInput
      prompt: Database password?
    - name: UseMonitoring
      type: Confirm
      prompt: Enable monitoring?
      default: false
    - name: Platform
      value: !fn os._operatingsystem
  files:
    - path: app.yaml.tmpl
    - path: config/settings.yaml
      renameTo: !expr "'config/' + AppName + '-settings.yaml'"
    - path: __test__/answers.yaml
  includeAfter:
    - blueprint: common/monitoring
      includeIf: UseMonitoring
"#;

const MONITORING_BLUEPRINT: &str = r#"
apiVersion: xl/v2
kind: Blueprint
metadata:
  name: monitoring
spec:
  parameters:
    - name: AlertEmail
      type: Input
      prompt: Alert email?
      default: ops@example.com
  files:
    - path: alerts.yaml.tmpl
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn repository() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "web/blueprint.yaml", ROOT_BLUEPRINT);
    write(root, "web/app.yaml.tmpl", "name: {{ .AppName }}\npassword: {{ .DbPassword }}\nos: {{ .Platform }}\n");
    write(root, "web/config/settings.yaml", "verbatim: {{ .AppName }}\n");
    write(root, "web/__test__/answers.yaml", "AppName: test\n");
    write(root, "common/monitoring/blueprint.yaml", MONITORING_BLUEPRINT);
    write(root, "common/monitoring/alerts.yaml.tmpl", "notify: {{ .AlertEmail }}\n");
    temp
}

fn service(repo: &Path) -> BlueprintService {
    let registry = FunctionRegistry::new().register("os", Arc::new(OsProvider::new()));
    BlueprintService::new(
        Box::new(LocalRepository::new(repo)),
        Box::new(PlaceholderRenderer::new()),
        Box::new(LocalFilesystem::new()),
        registry,
    )
}

/// Fails the test if the pipeline ever prompts.
struct NoPrompts;

impl InputSource for NoPrompts {
    fn ask(
        &mut self,
        variable: &Variable,
        _default: &Value,
        _options: &[ResolvedOption],
        _validator: AnswerValidator<'_>,
    ) -> BlueprintResult<Value> {
        panic!("unexpected prompt for {}", variable.name)
    }

    fn confirm(&mut self, _summary: &PreparedData) -> BlueprintResult<bool> {
        panic!("unexpected confirmation")
    }
}

fn request(output: &Path, answers: &str) -> GenerateRequest {
    let answers_file = output.with_extension("answers.yaml");
    fs::write(&answers_file, answers).unwrap();

    let mut request = GenerateRequest::new(output);
    request.answers = Some(load_answers(&answers_file).unwrap());
    request.pipeline = PipelineConfig {
        interactive: false,
        strict_answers: true,
        use_defaults_as_value: false,
        skip_final_confirm: true,
    };
    request
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn generates_files_values_and_secrets() {
    let repo = repository();
    let out = TempDir::new().unwrap();
    let output = out.path().join("project");

    let request = request(
        &output,
        "AppName: shop\nDbPassword: s3cret\nUseMonitoring: false\n",
    );
    let report = service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap();
    assert!(report.written);

    let app = fs::read_to_string(output.join("app.yaml")).unwrap();
    assert_eq!(
        app,
        format!("name: shop\npassword: !value DbPassword\nos: {}", std::env::consts::OS)
    );

    // Non-template files are copied verbatim under their new name.
    let settings = fs::read_to_string(output.join("config/shop-settings.yaml")).unwrap();
    assert_eq!(settings, "verbatim: {{ .AppName }}\n");

    assert!(!output.join("__test__").exists());
    assert!(!output.join("alerts.yaml").exists());

    let values = fs::read_to_string(output.join("xebialabs/values.xlvals")).unwrap();
    assert!(values.lines().any(|l| l == "AppName = shop"));
    let secrets = fs::read_to_string(output.join("xebialabs/secrets.xlvals")).unwrap();
    assert!(secrets.lines().any(|l| l == "DbPassword = s3cret"));
    let gitignore = fs::read_to_string(output.join("xebialabs/.gitignore")).unwrap();
    assert_eq!(gitignore, "secrets.xlvals\n");
}

#[test]
fn included_blueprint_is_generated_when_condition_holds() {
    let repo = repository();
    let out = TempDir::new().unwrap();
    let output = out.path().join("project");

    let request = request(
        &output,
        "AppName: shop\nDbPassword: x\nUseMonitoring: true\nAlertEmail: team@example.com\n",
    );
    let report = service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap();

    assert_eq!(report.prepared.skipped, Vec::<String>::new());
    let alerts = fs::read_to_string(output.join("alerts.yaml")).unwrap();
    assert_eq!(alerts, "notify: team@example.com");
}

#[test]
fn strict_answers_fail_before_anything_is_written() {
    let repo = repository();
    let out = TempDir::new().unwrap();
    let output = out.path().join("project");

    let request = request(&output, "AppName: shop\n");
    let err = service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap_err();

    assert!(err.to_string().contains("DbPassword"), "{err}");
    assert!(!output.exists());
}

#[test]
fn existing_output_needs_force() {
    let repo = repository();
    let out = TempDir::new().unwrap();
    let output = out.path().join("project");
    write(&output, "app.yaml", "keep me");

    let mut request = request(
        &output,
        "AppName: shop\nDbPassword: x\nUseMonitoring: false\n",
    );
    let err = service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap_err();
    assert!(matches!(
        err,
        BlueprintError::Application(ApplicationError::OutputExists { .. })
    ));
    assert_eq!(fs::read_to_string(output.join("app.yaml")).unwrap(), "keep me");

    request.force = true;
    service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap();
    assert!(fs::read_to_string(output.join("app.yaml")).unwrap().starts_with("name: shop"));
}

#[test]
fn dry_run_writes_nothing() {
    let repo = repository();
    let out = TempDir::new().unwrap();
    let output = out.path().join("project");

    let mut request = request(
        &output,
        "AppName: shop\nDbPassword: x\nUseMonitoring: false\n",
    );
    request.dry_run = true;
    let report = service(repo.path())
        .generate("web", &request, &mut NoPrompts)
        .unwrap();

    assert!(!report.written);
    assert!(report.files.iter().any(|f| f.path == output.join("app.yaml")));
    assert!(!output.exists());
}

#[test]
fn inspect_lists_the_composed_sequence() {
    let repo = repository();
    let composition = service(repo.path()).inspect("web").unwrap();

    let paths: Vec<_> = composition.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["web", "common/monitoring"]);
    assert_eq!(composition.entries[1].conditions.len(), 1);
}

#[test]
fn generates_into_memory_filesystem() {
    let repo = repository();
    let root = repo.path();
    let memory = MemoryFilesystem::new()
        .with_file(
            root.join("web/app.yaml.tmpl"),
            "name: {{ .AppName }}\npassword: {{ .DbPassword }}\n",
        )
        .with_file(root.join("web/config/settings.yaml"), "static\n");

    let service = BlueprintService::new(
        Box::new(LocalRepository::new(root)),
        Box::new(PlaceholderRenderer::new()),
        Box::new(memory.clone()),
        FunctionRegistry::new().register("os", Arc::new(OsProvider::new())),
    );
    let out = TempDir::new().unwrap();
    let output = PathBuf::from("/virtual/project");
    let mut request = request(
        &out.path().join("answers"),
        "AppName: shop\nDbPassword: x\nUseMonitoring: false\n",
    );
    request.output_dir = output.clone();

    service.generate("web", &request, &mut NoPrompts).unwrap();

    assert_eq!(
        memory.get(&output.join("app.yaml")).as_deref(),
        Some("name: shop\npassword: !value DbPassword")
    );
    assert_eq!(
        memory.get(&output.join("config/shop-settings.yaml")).as_deref(),
        Some("static\n")
    );
    let written: Vec<PathBuf> = memory
        .list_files()
        .into_iter()
        .filter(|p| p.starts_with(&output))
        .collect();
    assert!(written.contains(&output.join("xebialabs/values.xlvals")));
    assert!(!output.exists());
}
