//! Common YANG and YIN sources for tests.

// Phase ordering: `a` uses a grouping of the module it imports.
pub const IMPORTING_MODULE: &str = r#"
module a {
    namespace "urn:test:a";
    prefix a;
    import b { prefix b; }
    container top {
        uses b:shared;
    }
}
"#;

pub const IMPORTED_MODULE: &str = r#"
module b {
    namespace "urn:test:b";
    prefix b;
    grouping shared {
        leaf value { type string; }
    }
}
"#;

// Include / belongs-to
pub const PARENT_MODULE: &str = r#"
module parent {
    namespace "urn:test:parent";
    prefix p;
    include child;
    container top {
        leaf name { type string; }
    }
}
"#;

pub const CHILD_SUBMODULE: &str = r#"
submodule child {
    belongs-to parent { prefix p; }
    container from-child {
        leaf flag { type boolean; }
    }
}
"#;

// Copies of copies: `outer` reuses `inner`, two containers reuse `outer`.
pub const NESTED_GROUPINGS: &str = r#"
module nested {
    namespace "urn:test:nested";
    prefix n;
    grouping inner {
        leaf x { type string; }
    }
    grouping outer {
        uses inner;
    }
    container first {
        uses outer;
    }
    container second {
        uses outer;
    }
}
"#;

// An extension whose definition uses itself.
pub const RECURSIVE_EXTENSION: &str = r#"
module ext {
    namespace "urn:test:ext";
    prefix ex;
    extension annotation {
        argument text;
        ex:annotation "defined in terms of itself";
    }
    container annotated {
        ex:annotation "on a container";
        leaf plain { type string; }
    }
}
"#;

pub const AUGMENT_BASE: &str = r#"
module base {
    namespace "urn:test:base";
    prefix b;
    feature fancy;
    container top {
        leaf kept { type string; }
        leaf removable { type string; }
        leaf retyped { type string; }
        container optional {
            if-feature fancy;
        }
    }
}
"#;

// The first augment targets a node only the second one creates.
pub const AUGMENTING_MODULE: &str = r#"
module aug {
    namespace "urn:test:aug";
    prefix x;
    import base { prefix b; }
    augment "/b:top/x:inner" {
        leaf deep { type string; }
    }
    augment "/b:top" {
        container inner;
        description "adds inner";
    }
}
"#;

pub const DEVIATING_MODULE: &str = r#"
module dev {
    namespace "urn:test:dev";
    prefix d;
    import base { prefix b; }
    deviation "/b:top/b:removable" {
        deviate not-supported;
    }
    deviation "/b:top/b:retyped" {
        deviate replace {
            type int32;
        }
    }
}
"#;

pub const YIN_MODULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<module name="yb" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
  <namespace uri="urn:test:yb"/>
  <prefix value="yb"/>
  <container name="top">
    <description>
      <text>Declared in YIN</text>
    </description>
  </container>
</module>"#;

pub const AUGMENTS_YIN_MODULE: &str = r#"
module ya {
    namespace "urn:test:ya";
    prefix ya;
    import yb { prefix yb; }
    augment "/yb:top" {
        leaf from-yang { type string; }
    }
}
"#;
