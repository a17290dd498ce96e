use java_class_auditor::{audit_source, SecurityFinding, SecurityKind, Severity};

fn security(source: &str) -> Vec<SecurityFinding> {
    audit_source(source).expect("test source should analyze").security
}

fn kinds_of(findings: &[SecurityFinding]) -> Vec<SecurityKind> {
    findings.iter().map(|f| f.kind).collect()
}

#[test]
fn credential_field_with_real_literal_is_critical() {
    let source = r#"class Config {
        private String password = "Hunter2Secret!";
    }"#;
    let findings = security(source);
    let field_finding = findings
        .iter()
        .find(|f| f.kind == SecurityKind::HardcodedCredentials && f.severity == Severity::Critical)
        .expect("credential field should be reported");
    assert!(field_finding.description.contains("password"));
    assert_eq!(field_finding.line, 2);
}

#[test]
fn placeholder_credential_values_are_ignored() {
    let source = r#"class Config {
        private String password = "changeme";
        private String apiKey = "test";
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::HardcodedCredentials));
}

#[test]
fn environment_sourced_credentials_are_ignored() {
    let source = r#"class Config {
        private String password = System.getenv("DB_PASSWORD");
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::HardcodedCredentials));
}

#[test]
fn credential_looking_literal_in_regular_method_is_high() {
    let source = r#"class Session {
        String open() {
            return login("svc", "Sup3rSecret123!");
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::HardcodedCredentials && f.severity == Severity::High));
}

#[test]
fn credential_literals_inside_main_and_test_methods_are_suppressed() {
    let in_main = r#"class Demo {
        public static void main(String[] args) {
            login("svc", "Sup3rSecret123!");
        }
    }"#;
    assert!(!kinds_of(&security(in_main)).contains(&SecurityKind::HardcodedCredentials));

    let in_test = r#"class Demo {
        void testLogin() {
            login("svc", "Sup3rSecret123!");
        }
    }"#;
    assert!(!kinds_of(&security(in_test)).contains(&SecurityKind::HardcodedCredentials));
}

#[test]
fn sql_concatenation_is_critical_injection() {
    let source = r#"class Dao {
        void fetch(Statement stmt, String userId) {
            stmt.executeQuery("SELECT * FROM users WHERE id = " + userId);
        }
    }"#;
    let findings = security(source);
    let injection: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::SqlInjection)
        .collect();
    assert_eq!(injection.len(), 1);
    assert_eq!(injection[0].severity, Severity::Critical);
    assert_eq!(injection[0].line, 3);
}

#[test]
fn prepared_statement_receiver_is_not_flagged() {
    let source = r#"class Dao {
        void fetch(PreparedStatement preparedStatement, String boundSql) {
            preparedStatement.executeQuery(boundSql);
        }
    }"#;
    let findings = security(source);
    assert!(!kinds_of(&findings).contains(&SecurityKind::SqlInjection));
    assert!(!kinds_of(&findings).contains(&SecurityKind::DynamicSqlConstruction));
}

#[test]
fn query_variable_built_by_concatenation_is_dynamic_sql() {
    let source = r#"class Dao {
        void report(Statement stmt, String table) {
            String query = "SELECT count(*) FROM " + table;
            stmt.execute(query);
        }
    }"#;
    let findings = security(source);
    let dynamic: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::DynamicSqlConstruction)
        .collect();
    assert_eq!(dynamic.len(), 1);
    assert_eq!(dynamic[0].severity, Severity::Critical);
}

#[test]
fn runtime_exec_is_command_injection_outside_tests() {
    let source = r#"class Shell {
        void launch(String cmd) {
            Runtime.getRuntime().exec(cmd);
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::CommandInjection && f.severity == Severity::High));
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::DangerousMethodCall && f.severity == Severity::Medium));
}

#[test]
fn runtime_exec_inside_main_is_suppressed() {
    let source = r#"class Shell {
        public static void main(String[] args) {
            Runtime.getRuntime().exec("ls");
        }
    }"#;
    let findings = security(source);
    assert!(!kinds_of(&findings).contains(&SecurityKind::CommandInjection));
    assert!(!kinds_of(&findings).contains(&SecurityKind::DangerousMethodCall));
}

#[test]
fn concatenated_file_path_is_path_traversal() {
    let source = r#"class Storage {
        FileReader open(String name) {
            return new FileReader("/data/" + name);
        }
    }"#;
    let findings = security(source);
    let traversal: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::PathTraversal)
        .collect();
    assert_eq!(traversal.len(), 1);
    assert_eq!(traversal[0].severity, Severity::High);
}

#[test]
fn user_named_parameter_in_file_constructor_is_path_traversal() {
    let source = r#"class Storage {
        File resolve(String userPath) {
            return new File(userPath);
        }
    }"#;
    assert!(kinds_of(&security(source)).contains(&SecurityKind::PathTraversal));
}

#[test]
fn fixed_file_path_is_not_path_traversal() {
    let source = r#"class Storage {
        File logs() {
            return new File("/var/log/app.log");
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::PathTraversal));
}

#[test]
fn unchecked_parameter_dereference_is_null_risk() {
    let source = r#"class Greeter {
        void greet(Session session) {
            session.open();
        }
    }"#;
    let findings = security(source);
    let null_risk: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::NullPointerDereference)
        .collect();
    assert_eq!(null_risk.len(), 1);
    assert_eq!(null_risk[0].severity, Severity::Medium);
    assert!(null_risk[0].description.contains("session"));
}

#[test]
fn null_checked_parameter_is_quiet() {
    let source = r#"class Greeter {
        void greet(Session session) {
            if (session != null) {
                session.open();
            }
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::NullPointerDereference));
}

#[test]
fn lookup_result_without_null_check_is_flagged() {
    let source = r#"class Greeter {
        void greet(Registry registry) {
            Account account = registry.findAccount();
            account.touch();
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::NullPointerDereference
            && f.description.ends_with("account")));
}

#[test]
fn null_risk_is_suppressed_on_lines_with_security_findings() {
    // the receiver is an unchecked parameter, but the SQL rule claims the line
    let source = r#"class Dao {
        void fetch(Statement stmt, String userId) {
            stmt.executeQuery("SELECT * FROM users WHERE id = " + userId);
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::NullPointerDereference));
}

#[test]
fn null_risk_is_suppressed_inside_security_critical_methods() {
    let source = r#"class Dao {
        void executeTransfer(Ledger ledger) {
            ledger.move();
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::NullPointerDereference));
}

#[test]
fn weak_random_in_credential_context_is_flagged() {
    let source = r#"class Tokens {
        int generateToken() {
            Random rng = new Random();
            return rng.nextInt();
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::WeakRandom && f.severity == Severity::Medium));
}

#[test]
fn weak_random_in_plain_context_is_fine() {
    let source = r#"class Dice {
        int roll() {
            Random rng = new Random();
            return rng.nextInt(6);
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::WeakRandom));
}

#[test]
fn secret_named_string_local_is_sensitive_data() {
    let source = r#"class Session {
        void open() {
            String password = readConsole();
            submit(password);
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::SensitiveDataExposure && f.severity == Severity::Medium));
}

#[test]
fn securely_sourced_secret_local_is_fine() {
    let source = r#"class Session {
        void open() {
            String password = System.getenv("APP_PASS");
            submit(password);
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::SensitiveDataExposure));
}

#[test]
fn parameter_indexed_array_access_needs_bounds_check() {
    let source = r#"class Picker {
        int pick(int[] values, int idx) {
            return values[idx];
        }
    }"#;
    let findings = security(source);
    let bounds: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::ArrayBoundsCheck)
        .collect();
    assert_eq!(bounds.len(), 1);
    assert_eq!(bounds[0].severity, Severity::Medium);
}

#[test]
fn guarded_array_access_is_quiet() {
    let source = r#"class Picker {
        int pick(int[] values, int idx) {
            if (idx >= 0 && idx < values.length) return values[idx];
            return 0;
        }
    }"#;
    assert!(!kinds_of(&security(source)).contains(&SecurityKind::ArrayBoundsCheck));
}

#[test]
fn reference_cast_without_instanceof_is_flagged() {
    let source = r#"class Shapes {
        void draw(Object value) {
            Circle circle = (Circle) value;
            circle.render();
        }
    }"#;
    let findings = security(source);
    assert!(findings
        .iter()
        .any(|f| f.kind == SecurityKind::UnsafeCasting && f.severity == Severity::Low));
}

#[test]
fn instanceof_guard_or_primitive_target_silences_cast_rule() {
    let guarded = r#"class Shapes {
        void draw(Object value) {
            if (value instanceof Circle) {
                Circle circle = (Circle) value;
                circle.render();
            }
        }
    }"#;
    assert!(!kinds_of(&security(guarded)).contains(&SecurityKind::UnsafeCasting));

    let primitive = r#"class Shapes {
        int narrow(long wide) {
            return (int) wide;
        }
    }"#;
    assert!(!kinds_of(&security(primitive)).contains(&SecurityKind::UnsafeCasting));
}

#[test]
fn empty_catch_and_print_only_catch_are_reported() {
    let source = r#"class Robust {
        void swallow() {
            try {
                risky();
            } catch (Exception e) {
            }
        }
        void shrug() {
            try {
                risky();
            } catch (Exception e) {
                e.printStackTrace();
            }
        }
        void handle() {
            try {
                risky();
            } catch (Exception e) {
                recover(e);
            }
        }
    }"#;
    let findings = security(source);
    let empties: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::EmptyCatchBlock)
        .collect();
    assert_eq!(empties.len(), 1);
    let prints: Vec<_> = findings
        .iter()
        .filter(|f| f.kind == SecurityKind::PoorExceptionHandling)
        .collect();
    assert_eq!(prints.len(), 1);
}
