//! Course 1, "Raising your pet": an `Egg` class grown step by step into a `Pet`.

use questline_utils::java::{Construct, Param, Rule};

const EGG_CONSTRUCTOR_PARAMS: &[Param] = &[
    Param {
        ty: "String",
        name: "color",
    },
    Param {
        ty: "int",
        name: "size",
    },
];

const MAIN_PARAMS: &[Param] = &[Param {
    ty: "String[]",
    name: "args",
}];

const EGG_CLASS: Rule = Rule::new(
    "EGG_CLASS",
    Construct::ClassHeader {
        name: "Egg",
        extends: None,
    },
);

pub const SUB_LEVEL_1: &[Rule] = &[
    EGG_CLASS,
    Rule::new(
        "EGG_FIELD_COLOR",
        Construct::Field {
            ty: "String",
            name: "color",
        },
    ),
    Rule::new(
        "EGG_FIELD_SIZE",
        Construct::Field {
            ty: "int",
            name: "size",
        },
    ),
    Rule::new(
        "EGG_FIELD_HATCHED",
        Construct::Field {
            ty: "boolean",
            name: "hatched",
        },
    ),
];

pub const SUB_LEVEL_2: &[Rule] = &[
    Rule::new(
        "EGG_CONSTRUCTOR",
        Construct::Constructor {
            class: "Egg",
            params: EGG_CONSTRUCTOR_PARAMS,
        },
    ),
    Rule::new(
        "EGG_ASSIGN_COLOR",
        Construct::Statement("this.color = color;"),
    ),
    Rule::new("EGG_ASSIGN_SIZE", Construct::Statement("this.size = size;")),
    Rule::new(
        "EGG_ASSIGN_HATCHED",
        Construct::Statement("this.hatched = false;"),
    ),
];

pub const SUB_LEVEL_3: &[Rule] = &[
    Rule::new(
        "EGG_GETTER_COLOR",
        Construct::Method {
            is_static: false,
            returns: "String",
            name: "getColor",
            params: &[],
        },
    ),
    Rule::new(
        "EGG_GETTER_SIZE",
        Construct::Method {
            is_static: false,
            returns: "int",
            name: "getSize",
            params: &[],
        },
    ),
    Rule::new(
        "EGG_GETTER_HATCHED",
        Construct::Method {
            is_static: false,
            returns: "boolean",
            name: "isHatched",
            params: &[],
        },
    ),
];

pub const SUB_LEVEL_4: &[Rule] = &[
    Rule::new(
        "EGG_METHOD_HATCH",
        Construct::Method {
            is_static: false,
            returns: "void",
            name: "hatch",
            params: &[],
        },
    ),
    Rule::new(
        "EGG_SET_HATCHED",
        Construct::Statement("this.hatched = true;"),
    ),
    Rule::new("EGG_PRINT", Construct::Statement("System.out.println(")),
];

pub const SUB_LEVEL_5: &[Rule] = &[
    Rule::new(
        "PET_CLASS",
        Construct::ClassHeader {
            name: "Pet",
            extends: Some("Egg"),
        },
    ),
    Rule::new(
        "PET_FIELD_NAME",
        Construct::Field {
            ty: "String",
            name: "name",
        },
    ),
    Rule::new("PET_SUPER_CALL", Construct::Statement("super(")),
];

pub const SUB_LEVEL_6: &[Rule] = &[
    Rule::new(
        "MAIN_METHOD",
        Construct::Method {
            is_static: true,
            returns: "void",
            name: "main",
            params: MAIN_PARAMS,
        },
    ),
    Rule::new("MAIN_NEW_PET", Construct::Statement("new Pet(")),
    Rule::new("MAIN_CALL_HATCH", Construct::Statement(".hatch();")),
];

pub fn rules(sub_level: u32) -> Option<&'static [Rule]> {
    match sub_level {
        1 => Some(SUB_LEVEL_1),
        2 => Some(SUB_LEVEL_2),
        3 => Some(SUB_LEVEL_3),
        4 => Some(SUB_LEVEL_4),
        5 => Some(SUB_LEVEL_5),
        6 => Some(SUB_LEVEL_6),
        _ => None,
    }
}
