//! Built-in expression functions.
//!
//! Pure helpers except `randPassword` (OS randomness), the filesystem and URL
//! predicates (read-only I/O) and the registry-backed cloud helpers.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use md5::{Digest, Md5};
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use regex::Regex;

use crate::{
    domain::{Value, parse_bool},
    functions::FunctionRegistry,
};

const PASSWORD_LENGTH: usize = 16;

const AWS_CREDENTIAL_ATTRIBUTES: [&str; 5] = [
    "IsAvailable",
    "AccessKeyID",
    "SecretAccessKey",
    "SessionToken",
    "ProviderName",
];

const K8S_CONFIG_ATTRIBUTES: [&str; 9] = [
    "ClusterServer",
    "ClusterInsecureSkipTLSVerify",
    "ContextCluster",
    "ContextNamespace",
    "ContextUser",
    "UserClientCertificateData",
    "UserClientKeyData",
    "IsAvailable",
    "IsConfigAvailable",
];

const OS_MODULES: [&str; 4] = [
    "_defaultapiserverurl",
    "_operatingsystem",
    "getcertfilelocation",
    "getkeyfilelocation",
];

const VERSION_MODULES: [&str; 3] = ["_showapplicableversions", "checkversion", "getversionfromtag"];

static UNIX_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.?/[\w^ -]+)*/?([\w-])+[.]?[^.\s]*)$")
        .unwrap_or_else(|e| unreachable!("unix path pattern is valid: {e}"))
});

static UNIX_PATH_NO_SPACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.?/[\w^-]+)*/?([\w-])+[.]?[^.\s]*)$")
        .unwrap_or_else(|e| unreachable!("unix path pattern is valid: {e}"))
});

static DRIVE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]):\\").unwrap_or_else(|e| unreachable!("drive pattern is valid: {e}"))
});

/// What a built-in can see besides its arguments.
pub(crate) struct Scope<'a> {
    /// Coerced parameters, including the self value.
    pub params: &'a BTreeMap<String, Value>,
    pub registry: &'a FunctionRegistry,
}

pub(crate) fn call(name: &str, args: Vec<Value>, scope: &Scope<'_>) -> Result<Value, String> {
    match name {
        "strlen" => {
            let [s] = exactly::<1>(name, args)?;
            Ok(Value::Number(s.to_string().chars().count() as f64))
        }
        "max" => {
            let [a, b] = exactly::<2>(name, args)?;
            Ok(Value::Number(number(name, &a)?.max(number(name, &b)?)))
        }
        "min" => {
            let [a, b] = exactly::<2>(name, args)?;
            Ok(Value::Number(number(name, &a)?.min(number(name, &b)?)))
        }
        "ceil" => unary_math(name, args, f64::ceil),
        "floor" => unary_math(name, args, f64::floor),
        "round" => unary_math(name, args, f64::round),
        "randPassword" => Ok(Value::Str(random_password(PASSWORD_LENGTH))),
        "string" => {
            let [v] = exactly::<1>(name, args)?;
            Ok(Value::Str(v.to_string()))
        }
        "regex" => {
            let [pattern, value] = exactly::<2>(name, args)?;
            let pattern = text(name, &pattern)?;
            regex_match(&format!("^{pattern}$"), &value.to_string()).map(Value::Bool)
        }
        "isValidAbsPath" => {
            let (path, no_spaces) = match args.as_slice() {
                [path] => (text(name, path)?, false),
                [path, flag] => (text(name, path)?, flag.as_bool() == Some(true)),
                _ => return Err(arg_count(name, "1 or 2", args.len())),
            };
            Ok(Value::Bool(is_valid_abs_path(&path, no_spaces)))
        }
        "isFile" => {
            let [path] = exactly::<1>(name, args)?;
            Ok(Value::Bool(expand_home(&text(name, &path)?).is_file()))
        }
        "isDir" => {
            let [path] = exactly::<1>(name, args)?;
            Ok(Value::Bool(expand_home(&text(name, &path)?).is_dir()))
        }
        "isValidUrl" => {
            let [raw] = exactly::<1>(name, args)?;
            Ok(Value::Bool(is_valid_url(&raw.to_string())))
        }
        "normalizePath" => {
            let [path] = exactly::<1>(name, args)?;
            Ok(Value::Str(normalize_path(&path.to_string())))
        }
        "md5HashOfAnswersIncluding" => md5_of_answers(scope.params, &args, false),
        "md5HashOfAnswersNotIncluding" => md5_of_answers(scope.params, &args, true),
        "awsCredentials" => aws_credentials(args, scope.registry),
        "awsRegions" => aws_regions(args, scope.registry),
        "k8sConfig" => k8s_config(args, scope.registry),
        "os" => os_property(args, scope.registry),
        "version" => version_property(args, scope.registry),
        other => Err(format!("unknown function '{other}'")),
    }
}

// ── Argument helpers ─────────────────────────────────────────────────────────

fn exactly<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], String> {
    let len = args.len();
    args.try_into()
        .map_err(|_| arg_count(name, &N.to_string(), len))
}

fn arg_count(name: &str, expected: &str, got: usize) -> String {
    format!("invalid number of arguments for expression function '{name}', expecting {expected} got {got}")
}

fn number(name: &str, value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("'{name}' expects a number, got '{s}'")),
        other => Err(format!("'{name}' expects a number, got {}", other.type_name())),
    }
}

fn text(name: &str, value: &Value) -> Result<String, String> {
    match value {
        Value::List(_) => Err(format!("'{name}' expects a string, got list")),
        other => Ok(other.to_string()),
    }
}

fn unary_math(name: &str, args: Vec<Value>, f: fn(f64) -> f64) -> Result<Value, String> {
    let [v] = exactly::<1>(name, args)?;
    Ok(Value::Number(f(number(name, &v)?)))
}

// ── Pure helpers ─────────────────────────────────────────────────────────────

pub(crate) fn regex_match(pattern: &str, value: &str) -> Result<bool, String> {
    let re = Regex::new(pattern)
        .map_err(|e| format!("invalid pattern in regex expression, {e}"))?;
    Ok(re.is_match(value))
}

/// Alphanumeric password from the OS RNG with at least one digit.
pub(crate) fn random_password(len: usize) -> String {
    loop {
        let password: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        if len < 2 || password.chars().any(|c| c.is_ascii_digit()) {
            return password;
        }
    }
}

fn is_valid_abs_path(path: &str, no_spaces: bool) -> bool {
    is_valid_windows_path(path, no_spaces)
        || if no_spaces {
            UNIX_PATH_NO_SPACES.is_match(path)
        } else {
            UNIX_PATH.is_match(path)
        }
}

/// `X:\seg\seg`: segments are non-empty, free of `<>:"/\|?*`, and a segment
/// followed by a separator may not end in a space or a dot.
fn is_valid_windows_path(path: &str, no_spaces: bool) -> bool {
    let bytes = path.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_alphabetic() || &bytes[1..3] != b":\\" {
        return false;
    }
    let segments: Vec<&str> = path[3..].split('\\').collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| {
        if segment.is_empty() {
            return i == last;
        }
        let clean = !segment.contains(['<', '>', ':', '"', '/', '|', '?', '*'])
            && !(no_spaces && segment.contains(char::is_whitespace));
        clean && (i == last || !segment.ends_with([' ', '.']))
    })
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
            .map(|home| home.join(rest.trim_start_matches('/')))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => Path::new(path).to_path_buf(),
    }
}

fn is_valid_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| !u.scheme().is_empty() && u.host_str().is_some_and(|h| !h.is_empty()))
}

/// `C:\Users\me` becomes `/C/Users/me`, mountable in a container.
fn normalize_path(path: &str) -> String {
    DRIVE_PREFIX.replace(path, "/${1}/").replace('\\', "/")
}

fn md5_of_answers(
    params: &BTreeMap<String, Value>,
    filters: &[Value],
    exclude: bool,
) -> Result<Value, String> {
    let filters: Vec<String> = filters.iter().map(ToString::to_string).collect();
    let selected: BTreeMap<&String, serde_json::Value> = params
        .iter()
        .filter(|(k, _)| filters.is_empty() || filters.contains(k) != exclude)
        .map(|(k, v)| (k, to_json(v)))
        .collect();
    let encoded = serde_json::to_vec(&selected).map_err(|e| e.to_string())?;
    Ok(Value::Str(format!("{:x}", Md5::digest(&encoded))))
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
            serde_json::Value::from(*n as i64)
        }
        Value::Number(n) => serde_json::Value::from(*n),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
    }
}

// ── Registry-backed helpers ──────────────────────────────────────────────────

fn aws_credentials(args: Vec<Value>, registry: &FunctionRegistry) -> Result<Value, String> {
    let [attr] = exactly::<1>("awsCredentials", args)?;
    let attr = attr.to_string();
    if !AWS_CREDENTIAL_ATTRIBUTES.contains(&attr.as_str()) {
        return Err(format!(
            "attribute '{attr}' is not valid for expression function 'awsCredentials'"
        ));
    }

    let creds = match registry.call("aws", "credentials", &[]) {
        Ok(creds) => creds,
        Err(_) if attr == "IsAvailable" => return Ok(Value::Bool(false)),
        Err(e) => return Err(format!("error when executing 'awsCredentials', {e}")),
    };

    if attr == "IsAvailable" {
        let key = creds.attributes.get("AccessKeyID").map_or("", String::as_str);
        return Ok(Value::Bool(!key.is_empty()));
    }
    Ok(Value::Str(creds.attributes.get(&attr).cloned().unwrap_or_default()))
}

fn aws_regions(args: Vec<Value>, registry: &FunctionRegistry) -> Result<Value, String> {
    let (service, index) = match args.as_slice() {
        [service] => (service.to_string(), None),
        [service, index] => {
            let i = number("awsRegions", index)
                .map_err(|_| "second argument for expression function 'awsRegions' should be a number".to_string())?;
            (service.to_string(), Some(i as usize))
        }
        _ => return Err(arg_count("awsRegions", "between 1 and 2", args.len())),
    };

    let regions = registry
        .call("aws", "regions", &[service])
        .map_err(|e| format!("error when executing 'awsRegions', {e}"))?
        .values;

    match index {
        Some(i) => regions.get(i).cloned().map(Value::Str).ok_or_else(|| {
            format!("index {i} doesn't exist in the result of expression function 'awsRegions'")
        }),
        None => Ok(Value::List(regions.into_iter().map(Value::Str).collect())),
    }
}

fn k8s_config(args: Vec<Value>, registry: &FunctionRegistry) -> Result<Value, String> {
    let (attr, context) = match args.as_slice() {
        [attr] => (attr.to_string(), None),
        [attr, context] => (attr.to_string(), Some(context.to_string())),
        _ => return Err(arg_count("k8sConfig", "between 1 and 2", args.len())),
    };
    if !K8S_CONFIG_ATTRIBUTES.contains(&attr.as_str()) {
        return Err(format!(
            "attribute '{attr}' is not valid for expression function 'k8sConfig'"
        ));
    }
    let is_flag = attr.starts_with("Is");

    let config = match registry.call("k8s", "config", &context.into_iter().collect::<Vec<_>>()) {
        Ok(config) => config,
        Err(_) if is_flag => return Ok(Value::Bool(false)),
        Err(e) => return Err(format!("error when executing 'k8sConfig', {e}")),
    };

    let field = config.attributes.get(&attr).cloned().unwrap_or_default();
    if is_flag {
        Ok(Value::Bool(parse_bool(&field).unwrap_or(false)))
    } else {
        Ok(Value::Str(field))
    }
}

fn os_property(args: Vec<Value>, registry: &FunctionRegistry) -> Result<Value, String> {
    let [module] = exactly::<1>("os", args)?;
    let module = module.to_string();
    if !OS_MODULES.contains(&module.as_str()) {
        return Err(format!("attribute '{module}' is not valid for expression function 'os'"));
    }
    let result = registry
        .call("os", &module, &[])
        .map_err(|e| format!("error when executing 'os', {e}"))?;
    Ok(Value::Str(result.values.into_iter().next().unwrap_or_default()))
}

fn version_property(args: Vec<Value>, registry: &FunctionRegistry) -> Result<Value, String> {
    let mut args = args.into_iter().map(|a| a.to_string());
    let module = args
        .next()
        .ok_or_else(|| arg_count("version", "at least 1", 0))?;
    if !VERSION_MODULES.contains(&module.as_str()) {
        return Err(format!(
            "attribute '{module}' is not valid for expression function 'version'"
        ));
    }
    let params: Vec<String> = args.collect();
    let mut values = registry
        .call("version", &module, &params)
        .map_err(|e| format!("error when executing '{module}', {e}"))?
        .values;

    if module == "checkversion" {
        let first = values.first().map_or("", String::as_str);
        return Ok(Value::Bool(parse_bool(first).unwrap_or(false)));
    }
    if values.len() == 1 {
        return Ok(Value::Str(values.remove(0)));
    }
    Ok(Value::List(values.into_iter().map(Value::Str).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_has_digit_and_length() {
        for _ in 0..20 {
            let pw = random_password(PASSWORD_LENGTH);
            assert_eq!(pw.len(), PASSWORD_LENGTH);
            assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn windows_paths() {
        assert!(is_valid_abs_path(r"C:\Program Files\app", false));
        assert!(is_valid_abs_path(r"C:\", false));
        assert!(!is_valid_abs_path(r"C:\Program Files\app", true));
        assert!(!is_valid_abs_path(r"C:\bad|na me", false));
        assert!(!is_valid_abs_path(r"C:\trailing.\x", false));
    }

    #[test]
    fn unix_paths() {
        assert!(is_valid_abs_path("/usr/local/bin", false));
        assert!(is_valid_abs_path("/home/my dir/file.txt", false));
        assert!(!is_valid_abs_path("/home/my dir/file.txt", true));
    }

    #[test]
    fn normalizes_windows_paths() {
        assert_eq!(normalize_path(r"C:\Users\me"), "/C/Users/me");
        assert_eq!(normalize_path("/already/unix"), "/already/unix");
    }

    #[test]
    fn urls_need_scheme_and_host() {
        assert!(is_valid_url("https://xebialabs.com/path"));
        assert!(!is_valid_url("xebialabs.com"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn md5_of_answers_is_stable_and_filtered() {
        let mut params = BTreeMap::new();
        params.insert("A".to_string(), Value::Number(1.0));
        params.insert("B".to_string(), Value::from("x"));

        let all = md5_of_answers(&params, &[], false).unwrap();
        let only_a = md5_of_answers(&params, &[Value::from("A")], false).unwrap();
        let not_b = md5_of_answers(&params, &[Value::from("B")], true).unwrap();

        assert_eq!(only_a, not_b);
        assert_ne!(all, only_a);
        assert_eq!(only_a, Value::from("e48f86a65190e717e14e9a390990786c"));
    }
}
