use renderdesk::frames;

pub fn handle(expr: &str, span: bool) -> anyhow::Result<()> {
    if span {
        match frames::frame_span(expr)? {
            Some((first, last)) => println!("{}", frames::format_range(first, last)),
            None => println!(),
        }
    } else {
        println!("{}", frames::frame_list(expr)?);
    }
    Ok(())
}
