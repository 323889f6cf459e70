use featurescope::FeatureScope;

fn main() -> iced::Result {
    env_logger::init();

    iced::application("Featurescope", FeatureScope::update, FeatureScope::view)
        .subscription(FeatureScope::subscription)
        .theme(FeatureScope::theme)
        .centered()
        .run_with(FeatureScope::new)
}
