use super::*;
use crate::frontend::Parser;
use crate::sema::Analyzer;

fn try_compile(source: &str) -> Result<Assembly, CodegenError> {
    let mut parser = Parser::new(source);
    let program = parser.parse_program().unwrap();
    let interner = parser.into_interner();
    let mut analyzer = Analyzer::new();
    analyzer.analyze(&program, &interner).unwrap();
    let output = analyzer.into_output();
    generate(&program, &output, &interner)
}

fn compile(source: &str) -> String {
    try_compile(source).unwrap().to_string()
}

fn program(members: &str) -> String {
    format!("using CbRuntime;\nclass Test {{\n{}\n}}", members)
}

/// Lines of one method, from its label through `.ltorg`
fn method_body(asm: &str, label: &str) -> Vec<String> {
    asm.lines()
        .skip_while(|line| *line != format!("{}:", label))
        .take_while(|line| line.trim() != ".ltorg")
        .map(str::to_string)
        .collect()
}

#[test]
fn immediate_encoding_thresholds() {
    let asm = compile(&program(
        "static void Main() { int a; a = 255; a = 256; a = -255; a = -256; a = -1; }",
    ));
    assert!(asm.contains("\tmov\tr4, #255\n"));
    assert!(asm.contains("\tldr\tr4, =256\n"));
    assert!(asm.contains("\tmvn\tr4, #254\n"));
    assert!(asm.contains("\tldr\tr4, =-256\n"));
    assert!(asm.contains("\tmvn\tr4, #0\n"));
}

#[test]
fn pair_sum_end_to_end() {
    let source = program(
        "const int N = 10;
         struct Pair { int a; int b; }
         static int sum(Pair p) { return p.a + p.b; }
         static void Main() { Pair q; q.a = N; q.b = 2; cbio.write(sum(q)); }",
    );
    let assembly = try_compile(&source).unwrap();
    assert_eq!(assembly.calls_to("div_mod"), 0);

    let asm = assembly.to_string();
    assert_eq!(asm.matches("\nsum:\n").count(), 1);
    let sum = method_body(&asm, "sum");
    assert!(!sum.iter().any(|l| l.starts_with("\tsub\tsp")));
    assert!(sum.contains(&"\tldr\tr4, [fp, #36]".to_string()));
    assert!(sum.contains(&"\tldr\tr5, [fp, #40]".to_string()));
    assert!(sum.contains(&"\tadd\tr4, r4, r5".to_string()));
    assert!(sum.contains(&"\tmov\tr0, r4".to_string()));

    let main = method_body(&asm, "Main");
    assert!(main.contains(&"\tsub\tsp, sp, #8".to_string()));
    assert!(main.contains(&"\tldr\tr4, _C.N".to_string()));
    // Struct argument pushed last word first, then popped by the caller
    let pushes: Vec<_> = main
        .iter()
        .filter(|l| l.ends_with("[sp, #-4]!"))
        .collect();
    assert_eq!(pushes.len(), 2);
    assert!(main.contains(&"\tldr\tr4, [fp, #-4]".to_string()));
    assert!(main.contains(&"\tbl\tsum".to_string()));
    assert!(main.contains(&"\tadd\tsp, sp, #8".to_string()));
    assert!(asm.contains("_C.N:\n\t.word 10\n"));
}

#[test]
fn frame_reserves_one_slot_per_word() {
    let asm = compile(&program(
        "struct Pair { int a; int b; }
         static void Main() { int x; Pair p; if (true) { bool y; } }",
    ));
    assert!(asm.contains("\tsub\tsp, sp, #16\n"));
}

#[test]
fn program_entry_and_sections() {
    let asm = compile(&program("static void Main() { cbio.write(\"hi\"); }"));
    let lines: Vec<&str> = asm.lines().collect();
    let start = lines.iter().position(|l| *l == "_start:").unwrap();
    assert_eq!(
        &lines[start + 1..start + 5],
        ["\tbl\tMain", "\tmov\tr0, #0", "\tmov\tr7, #1", "\tswi\t#0"]
    );
    assert!(lines[0].starts_with("@ "));

    let text_end = lines.iter().rposition(|l| *l == "\t.ltorg").unwrap();
    let data = lines.iter().position(|l| *l == "\t.data").unwrap();
    assert!(data > text_end);
    assert_eq!(lines.last(), Some(&"\t.end"));
}

#[test]
fn method_frame_shape() {
    let asm = compile(&program("static void Main() { int x; x = 1; }"));
    let main = method_body(&asm, "Main");
    assert_eq!(
        &main[..4],
        ["Main:", "\tstmfd\tsp!, {r4-r11, lr}", "\tmov\tfp, sp", "\tsub\tsp, sp, #4"]
    );
    assert!(asm.contains("_L.0:\n\tmov\tsp, fp\n\tldmfd\tsp!, {r4-r11, pc}\n\t.ltorg\n"));
}

#[test]
fn break_leaves_the_innermost_loop() {
    let asm = compile(&program(
        "static void Main() {
            while (true) {
                while (true) { break; }
                break;
            }
        }",
    ));
    // _L.0 is the return label; loops take test, body and exit labels
    let main = method_body(&asm, "Main");
    let inner_break = main.iter().position(|l| l == "_L.5:").unwrap() + 1;
    assert_eq!(main[inner_break], "\tb\t_L.6");
    assert!(main.contains(&"\tb\t_L.3".to_string()));
    assert!(!main.contains(&"\tb\t_L.0".to_string()));
}

#[test]
fn string_pool_is_deduplicated() {
    let asm = compile(&program(
        "const string title = \"hi\";
         static void Main() {
            cbio.write(\"hi\");
            cbio.write(\"hi\");
            cbio.write(\"yo\\n\");
            cbio.write(title);
        }",
    ));
    assert_eq!(asm.matches(".asciz").count(), 3);
    assert!(asm.contains("_C.title:\n\t.asciz \"hi\"\n"));
    assert!(asm.contains("_S.0:\n\t.asciz \"hi\"\n"));
    assert!(asm.contains("_S.1:\n\t.asciz \"yo\\n\"\n"));
    assert!(asm.contains("\tldr\tr4, =_C.title\n"));
    assert_eq!(asm.matches("\tldr\tr4, =_S.0\n").count(), 2);
    assert_eq!(asm.matches("\tbl\twrite_string\n").count(), 4);
}

#[test]
fn struct_assignment_copies_each_word() {
    let asm = compile(&program(
        "struct Pair { int a; int b; }
         static void Main() { Pair p; Pair q; q = p; }",
    ));
    let main = method_body(&asm, "Main").join("\n");
    assert!(main.contains(
        "\tldr\tr4, [fp, #-8]\n\tstr\tr4, [fp, #-16]\n\tldr\tr4, [fp, #-4]\n\tstr\tr4, [fp, #-12]"
    ));
}

#[test]
fn nested_field_offsets_fold() {
    let asm = compile(&program(
        "struct Pair { int a; int b; }
         struct Rect { Pair topleft; Pair bottomright; }
         static void Main() { Rect r; r.bottomright.b = 5; }",
    ));
    assert!(asm.contains("\tmov\tr4, #5\n\tstr\tr4, [fp, #-4]\n"));
}

#[test]
fn struct_results_are_heap_copies() {
    let asm = compile(&program(
        "struct Pair { int a; int b; }
         static Pair make() { Pair p; p.a = 1; return p; }
         static void Main() { Pair q; q = make(); }",
    ));
    let make = method_body(&asm, "make").join("\n");
    assert!(make.contains("\tmov\tr0, #8\n\tbl\tmalloc\n"));
    assert!(make.contains("\tldr\tr4, [fp, #-8]\n\tstr\tr4, [r0]\n"));
    assert!(make.contains("\tldr\tr4, [fp, #-4]\n\tstr\tr4, [r0, #4]\n"));

    let main = method_body(&asm, "Main").join("\n");
    assert!(main.contains("\tbl\tmake\n\tmov\tr4, r0\n"));
    assert!(main.contains("\tldr\tr5, [r4]\n\tstr\tr5, [fp, #-8]\n"));
}

#[test]
fn arrays_allocate_with_length_header() {
    let asm = compile(&program(
        "static void Main() { int[] a; int n; a = new int[10]; a[2] = 7; n = a.Length; }",
    ));
    let main = method_body(&asm, "Main").join("\n");
    assert!(main.contains(
        "\tmov\tr4, #10\n\tmov\tr5, #4\n\tmul\tr5, r4, r5\n\tadd\tr5, r5, #4\n\tmov\tr0, r5\n\tbl\tmalloc\n\tstr\tr4, [r0]\n\tadd\tr4, r0, #4"
    ));
    assert!(main.contains("\tstr\tr4, [r5, r6, lsl #2]"));
    assert!(main.contains("\tldr\tr4, [r4, #-4]"));
}

#[test]
fn string_length_calls_strlen() {
    let asm = compile(&program(
        "static void Main() { int n; n = \"abc\".Length; }",
    ));
    assert!(asm.contains("\tmov\tr0, r4\n\tbl\tstrlen\n\tmov\tr4, r0\n"));
}

#[test]
fn division_and_modulo_use_runtime_helper() {
    let source = program("static void Main() { int x; x = 7 / 2; x = 7 % 2; }");
    let assembly = try_compile(&source).unwrap();
    assert_eq!(assembly.calls_to("div_mod"), 2);
    let asm = assembly.to_string();
    assert!(asm.contains("\tmov\tr0, r4\n\tmov\tr1, r5\n\tbl\tdiv_mod\n\tmov\tr4, r0\n"));
    assert!(asm.contains("\tbl\tdiv_mod\n\tmov\tr4, r1\n"));
}

#[test]
fn arithmetic_lowering() {
    let asm = compile(&program(
        "static void Main() { int x; x = -x * 3 - 1; }",
    ));
    assert!(asm.contains("\trsb\tr4, r4, #0\n"));
    assert!(asm.contains("\tmul\tr4, r5, r4\n"));
    assert!(asm.contains("\tsub\tr4, r4, r5\n"));
}

#[test]
fn conditions_lower_to_jumps() {
    let asm = compile(&program(
        "static void Main() {
            int a;
            bool b;
            if (a < 3 && b) { a = 1; } else { a = 2; }
        }",
    ));
    let main = method_body(&asm, "Main").join("\n");
    // then, end, else labels follow the return label
    assert!(main.contains("\tcmp\tr4, r5\n\tblt\t_L.4\n\tb\t_L.3\n_L.4:\n"));
    assert!(main.contains("\tcmp\tr4, #0\n\tbne\t_L.1\n\tb\t_L.3\n_L.1:\n"));
}

#[test]
fn comparison_as_value_materialises_bool() {
    let asm = compile(&program(
        "static void Main() { bool b; b = 1 == 2; }",
    ));
    assert!(asm.contains("\tbeq\t_L.1\n\tb\t_L.2\n_L.1:\n\tmov\tr4, #1\n\tb\t_L.3\n_L.2:\n\tmov\tr4, #0\n_L.3:\n"));
}

#[test]
fn overloaded_methods_get_numbered_labels() {
    let asm = compile(&program(
        "static void f(int a) {}
         static void f(string s) {}
         static void Main() { f(\"x\"); f(1); }",
    ));
    assert!(asm.contains("\nf.1:\n"));
    assert!(asm.contains("\nf.2:\n"));
    let main = method_body(&asm, "Main").join("\n");
    let second = main.find("\tbl\tf.2").unwrap();
    let first = main.find("\tbl\tf.1").unwrap();
    assert!(second < first);
}

#[test]
fn runtime_read_stores_into_out_argument() {
    let asm = compile(&program("static void Main() { int n; cbio.read(out n); }"));
    assert!(asm.contains("\tbl\tread_int\n\tmov\tr4, r0\n\tstr\tr4, [fp, #-4]\n"));
}

#[test]
fn increment_and_decrement() {
    let asm = compile(&program("static void Main() { int n; n++; n--; }"));
    assert!(asm.contains("\tldr\tr4, [fp, #-4]\n\tadd\tr4, r4, #1\n\tstr\tr4, [fp, #-4]\n"));
    assert!(asm.contains("\tsub\tr4, r4, #1\n"));
}

#[test]
fn deep_expressions_run_out_of_registers() {
    let source = program(
        "static void Main() {
            int x;
            x = 1 + (1 + (1 + (1 + (1 + (1 + (1 + (1 + 1)))))));
        }",
    );
    assert_eq!(
        try_compile(&source),
        Err(CodegenError::OutOfRegisters { line: 5 })
    );
}

#[test]
fn fresh_generators_produce_identical_output() {
    let source = program("static void Main() { cbio.write(\"a\"); if (true) { } }");
    assert_eq!(compile(&source), compile(&source));
}

#[test]
fn large_frames_reserve_through_ip() {
    let locals: String = (0..257).map(|i| format!("int v{i}; ")).collect();
    let asm = compile(&program(&format!(
        "static void Main() {{ {locals}v256 = 1; }}"
    )));
    let main = method_body(&asm, "Main");
    assert!(asm.contains("\tldr\tip, =1028\n\tsub\tsp, sp, ip\n"));
    assert!(!asm.contains("#1028"));
    assert!(main.contains(&"\tstr\tr4, [fp, #-1028]".to_string()));
}

#[test]
fn distant_struct_fields_are_addressed_through_ip() {
    let fields: String = (0..1100).map(|i| format!("int f{i}; ")).collect();
    let asm = compile(&program(&format!(
        "struct Big {{ {fields}}}
         static void Main() {{ Big b; b.f0 = 7; b.f1099 = 8; }}"
    )));
    assert!(asm.contains("\tldr\tip, =4400\n\tsub\tsp, sp, ip\n"));
    assert!(asm.contains("\tldr\tip, =-4400\n\tadd\tip, fp, ip\n\tstr\tr4, [ip]\n"));
    assert!(asm.contains("\tstr\tr4, [fp, #-4]\n"));
}
