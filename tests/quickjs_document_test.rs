use frontier_document::config::BridgeConfig;
use frontier_document::document::{DocumentConfig, TagNameCase};
use frontier_document::js::environment::JsDocumentEnvironment;

const PAGE: &str = "<!DOCTYPE html><html><head><title>t</title></head>\
    <body><h1 id=\"title\">Hello</h1><p class=\"a\">one</p><p>two</p></body></html>";

fn environment() -> JsDocumentEnvironment {
    JsDocumentEnvironment::new(PAGE).expect("environment")
}

fn eval_bool(environment: &JsDocumentEnvironment, source: &str) -> bool {
    environment
        .eval_with::<bool>(source, "document-test.js")
        .expect("script result")
}

fn eval_string(environment: &JsDocumentEnvironment, source: &str) -> String {
    environment
        .eval_with::<String>(source, "document-test.js")
        .expect("script result")
}

#[test]
fn create_element_returns_element_with_tag() {
    let environment = environment();
    assert_eq!(
        eval_string(&environment, "document.createElement('div').tagName"),
        "div"
    );
    assert!(eval_bool(
        &environment,
        "document.createElement('span').parentNode === null"
    ));
    assert!(eval_bool(
        &environment,
        "document.createElement('a').nodeType === 1"
    ));
}

#[test]
fn create_element_without_arguments_throws_type_error() {
    let environment = environment();
    let outcome = eval_string(
        &environment,
        r#"(() => {
            const before = document.all.length;
            try {
                document.createElement();
                return 'no error';
            } catch (err) {
                const unchanged = document.all.length === before;
                return `${err instanceof TypeError}:${unchanged}:${err.message}`;
            }
        })()"#,
    );
    assert_eq!(
        outcome,
        "true:true:Failed to execute 'createElement' on 'Document': 1 argument required, but only 0 present."
    );
}

#[test]
fn create_element_rejects_non_string_name() {
    let environment = environment();
    assert!(eval_bool(
        &environment,
        "(() => { try { document.createElement(7); return false; } catch (err) { return err instanceof TypeError; } })()"
    ));
}

#[test]
fn node_name_is_document() {
    let environment = environment();
    assert_eq!(eval_string(&environment, "document.nodeName"), "#document");
}

#[test]
fn enumeration_lists_dispatch_names_in_order() {
    let environment = environment();
    let keys = eval_string(&environment, "Object.keys(document).join(',')");
    assert_eq!(
        keys,
        "createElement,body,createTextNode,createComment,nodeName,getElementById,documentElement,getElementsByTagName,all"
    );
    let again = eval_string(&environment, "Object.keys(document).join(',')");
    assert_eq!(keys, again);
    assert!(eval_bool(&environment, "'getElementById' in document"));
}

#[test]
fn functions_and_nodes_keep_identity() {
    let environment = environment();
    assert!(eval_bool(
        &environment,
        "document.createElement === document.createElement"
    ));
    assert!(eval_bool(
        &environment,
        "document.getElementById('title') === document.getElementById('title')"
    ));
    assert!(eval_bool(
        &environment,
        "document.body === document.getElementsByTagName('body')[0]"
    ));
    assert!(eval_bool(
        &environment,
        "document.documentElement.tagName === 'html'"
    ));
}

#[test]
fn get_element_by_id_prefers_last_added_duplicate() {
    let environment = environment();
    let outcome = eval_string(
        &environment,
        r#"(() => {
            const first = document.createElement('div');
            const second = document.createElement('div');
            first.setAttribute('id', 'dup');
            second.setAttribute('id', 'dup');
            const picked = document.getElementById('dup') === second;
            second.removeAttribute('id');
            const fallback = document.getElementById('dup') === first;
            first.id = 'other';
            const gone = document.getElementById('dup') === null;
            return `${picked}:${fallback}:${gone}`;
        })()"#,
    );
    assert_eq!(outcome, "true:true:true");
}

#[test]
fn get_element_by_id_misses_with_null() {
    let environment = environment();
    assert!(eval_bool(
        &environment,
        "document.getElementById('missing') === null"
    ));
}

#[test]
fn body_is_null_when_tree_has_no_body() {
    let environment = JsDocumentEnvironment::from_tree(
        std::rc::Rc::new(std::cell::RefCell::new(frontier_document::NativeTree::new())),
        &BridgeConfig::default(),
    )
    .expect("environment");
    assert!(eval_bool(&environment, "document.body === null"));
    assert!(eval_bool(&environment, "document.documentElement === null"));
    assert!(eval_bool(&environment, "document.all.length === 0"));
}

#[test]
fn get_elements_by_tag_name_returns_snapshot() {
    let environment = environment();
    let counts = eval_string(
        &environment,
        r#"(() => {
            const before = document.getElementsByTagName('p');
            document.body.appendChild(document.createElement('p'));
            const after = document.getElementsByTagName('P');
            return `${before.length}:${after.length}:${document.getElementsByTagName('*').length}`;
        })()"#,
    );
    assert_eq!(counts, "2:3:8");
}

#[test]
fn text_and_comment_nodes() {
    let environment = environment();
    let summary = eval_string(
        &environment,
        r#"(() => {
            const text = document.createTextNode(42);
            const comment = document.createComment('note');
            return `${text.nodeType}:${text.data}:${comment.nodeName}:${comment.data}`;
        })()"#,
    );
    assert_eq!(summary, "3:42:#comment:note");
}

#[test]
fn unknown_properties_fall_through_to_node() {
    let environment = environment();
    assert!(eval_bool(&environment, "document.nodeType === 9"));
    assert!(eval_bool(&environment, "document.cookie === undefined"));
    assert!(eval_bool(
        &environment,
        "document.childNodes[0] === document.documentElement"
    ));
}

#[test]
fn script_mutations_reach_native_tree() {
    let environment = environment();
    environment
        .eval(
            "const note = document.createElement('section'); \
             note.setAttribute('id', 'note'); \
             note.appendChild(document.createTextNode('added')); \
             document.body.appendChild(note);",
            "mutate.js",
        )
        .expect("mutation script");
    let html = environment.document_html();
    assert!(html.contains("<section id=\"note\">added</section>"), "{html}");
    assert!(environment
        .document()
        .borrow()
        .registry()
        .contains_id("note"));
}

#[test]
fn preserve_case_config_reaches_create_element() {
    let config = BridgeConfig {
        document: DocumentConfig {
            tag_name_case: TagNameCase::Preserve,
        },
        ..BridgeConfig::default()
    };
    let environment = JsDocumentEnvironment::with_config(PAGE, &config).expect("environment");
    assert_eq!(
        eval_string(&environment, "document.createElement('myWidget').tagName"),
        "myWidget"
    );
}

#[test]
fn hierarchy_errors_surface_as_plain_errors() {
    let environment = environment();
    let outcome = eval_string(
        &environment,
        r#"(() => {
            const outer = document.createElement('div');
            const inner = document.createElement('div');
            outer.appendChild(inner);
            try {
                inner.appendChild(outer);
                return 'no error';
            } catch (err) {
                return `${err instanceof TypeError}:${err instanceof Error}`;
            }
        })()"#,
    );
    assert_eq!(outcome, "false:true");
}

#[test]
fn document_node_rejects_second_element_and_text() {
    let environment = environment();
    let outcome = eval_string(
        &environment,
        r#"(() => {
            const results = [];
            for (const node of [document.createElement('p'), document.createTextNode('loose')]) {
                try {
                    document.appendChild(node);
                    results.push('accepted');
                } catch (err) {
                    results.push(`${err instanceof TypeError}:${err instanceof Error}`);
                }
            }
            return `${results.join(',')}:${document.childNodes.length}`;
        })()"#,
    );
    assert_eq!(outcome, "false:true,false:true:1");
    let html = environment.document_html();
    assert!(html.ends_with("</html>"), "{html}");
}

#[test]
fn document_element_tracks_root_replacement() {
    let environment = environment();
    let outcome = eval_string(
        &environment,
        r#"(() => {
            const html = document.documentElement;
            document.removeChild(html);
            const div = document.createElement('div');
            document.appendChild(div);
            const swapped = `${document.documentElement.tagName}:${document.body === null}`;
            document.removeChild(div);
            document.appendChild(html);
            const restored = document.documentElement === html
                && document.body.parentNode === document.documentElement;
            return `${swapped}:${restored}`;
        })()"#,
    );
    assert_eq!(outcome, "div:true:true");
}
