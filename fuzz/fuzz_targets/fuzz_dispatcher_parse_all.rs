#![no_main]

use libfuzzer_sys::fuzz_target;

use boxon::bits::Charset;
use boxon::dispatcher::Dispatcher;
use boxon::engine::Engine;
use boxon::eval::DefaultEvaluator;
use boxon::template::{BindingCommon, Binding, Header, IntegerBinding, TemplateBuilder};
use boxon::types::{Endian, Primitive};

fn build_engine() -> Engine {
    let evaluator = DefaultEvaluator::new();
    let short = TemplateBuilder::new("Short")
        .header(Header::from_strings(&["+"], None, Charset::UsAscii).unwrap())
        .field(Binding::Integer(IntegerBinding {
            common: BindingCommon::new("code"),
            bit_size: "8".into(),
            byte_order: Endian::Big,
            target: Primitive::UByte,
        }))
        .unwrap()
        .build(&evaluator)
        .unwrap();
    let long = TemplateBuilder::new("Long")
        .header(Header::from_strings(&["+B"], None, Charset::UsAscii).unwrap())
        .field(Binding::Integer(IntegerBinding {
            common: BindingCommon::new("payload"),
            bit_size: "16".into(),
            byte_order: Endian::Big,
            target: Primitive::UShort,
        }))
        .unwrap()
        .build(&evaluator)
        .unwrap();
    Engine::builder()
        .with_template(short)
        .with_template(long)
        .build()
        .unwrap()
}

// spec.md P9: parse_all must never panic on arbitrary input, must make
// forward progress over the whole buffer, and every offset it reports for
// a failed message must lie within the scanned buffer.
fuzz_target!(|data: &[u8]| {
    let engine = build_engine();
    let dispatcher = Dispatcher::new(&engine);
    let outcome = dispatcher.parse_all(data);
    for failure in &outcome.errors {
        assert!(failure.offset < data.len().max(1));
    }
    for message in &outcome.messages {
        assert!(message.template_name == "Short" || message.template_name == "Long");
    }
});
