use serde_json::json;
use spa_stack_core::{
    HostedZone, ProvisioningPlanBuilder, SiteConfig, StackError, StaticZones, TemplateSynthesizer,
};

fn zones() -> StaticZones {
    StaticZones::new([HostedZone::new("staging.example.com.", "ZSTAGING")])
}

fn custom_config() -> SiteConfig {
    SiteConfig::new("site", "shop", "staging")
        .with_domain_name("app.staging.example.com")
        .with_custom_domain(true)
}

#[tokio::test]
async fn test_basic_site_synthesizes_single_stack() {
    let config = SiteConfig::new("site", "shop", "dev").with_domain_name("app.example.com");
    let mut synth = TemplateSynthesizer::new("devSpaStack", "eu-west-1", StaticZones::default());

    ProvisioningPlanBuilder::new(&config)
        .build_stack(&mut synth)
        .await
        .unwrap();
    let app = synth.finish();

    assert_eq!(app.stacks.len(), 1);
    let template = &app.stacks[0].template;
    assert!(template.parameters.is_empty());
    assert!(!template.resources.contains_key("siteWebsiteCertificate"));
    assert!(!template.resources.contains_key("siteCloudfrontARecord"));

    let bucket = &template.resources["siteWebsiteBucket"];
    assert_eq!(bucket.resource_type, "AWS::S3::Bucket");
    assert_eq!(bucket.deletion_policy.as_deref(), Some("Delete"));
    assert_eq!(bucket.update_replace_policy.as_deref(), Some("Delete"));

    let distribution = &template.resources["siteCloudFrontDistribution"].properties;
    let config = &distribution["DistributionConfig"];
    assert!(config.get("ViewerCertificate").is_none());
    assert_eq!(
        config["DefaultCacheBehavior"]["ResponseHeadersPolicyId"],
        json!({ "Ref": "siteResponseHeaderPolicy" })
    );
    assert_eq!(
        config["Origins"][0]["DomainName"],
        json!({ "Fn::GetAtt": ["siteWebsiteBucket", "RegionalDomainName"] })
    );

    let parameter = &template.resources["siteshopDeployParams"].properties;
    assert_eq!(parameter["Name"], json!("/dev/deploy/app.example.com/env"));
    assert_eq!(
        parameter["Value"],
        json!({ "Fn::Join": ["", [
            "AWS_S3_BUCKET=",
            { "Ref": "siteWebsiteBucket" },
            "\nDISTRIBUTION_ID=",
            { "Ref": "siteCloudFrontDistribution" }
        ]] })
    );

    let export = template.outputs["siteBucketName"].export.as_ref().unwrap();
    assert_eq!(export.name, "shop-bucket-name");
}

#[tokio::test]
async fn test_certificate_moves_to_companion_stack_outside_us_east_1() {
    let config = custom_config();
    let mut synth = TemplateSynthesizer::new("stagingSpaStack", "eu-west-1", zones());

    ProvisioningPlanBuilder::new(&config)
        .build_stack(&mut synth)
        .await
        .unwrap();
    let app = synth.finish();

    let names: Vec<&str> = app.stacks.iter().map(|stack| stack.name.as_str()).collect();
    assert_eq!(names, vec!["stagingSpaStack-us-east-1", "stagingSpaStack"]);

    let companion = app.stack("stagingSpaStack-us-east-1").unwrap();
    assert_eq!(companion.region, "us-east-1");
    let certificate = &companion.template.resources["siteWebsiteCertificate"];
    assert_eq!(
        certificate.properties["DomainValidationOptions"][0]["HostedZoneId"],
        json!("ZSTAGING")
    );
    assert!(companion.template.outputs.contains_key("siteWebsiteCertificateRef"));

    let primary = app.stack("stagingSpaStack").unwrap();
    assert!(!primary.template.resources.contains_key("siteWebsiteCertificate"));
    assert_eq!(
        primary.parameter_sources["siteWebsiteCertificateRef"].stack_name,
        "stagingSpaStack-us-east-1"
    );

    let viewer = &primary.template.resources["siteCloudFrontDistribution"].properties
        ["DistributionConfig"]["ViewerCertificate"];
    assert_eq!(viewer["AcmCertificateArn"], json!({ "Ref": "siteWebsiteCertificateRef" }));
    assert_eq!(viewer["SslSupportMethod"], json!("sni-only"));

    let record = &primary.template.resources["siteCloudfrontARecord"].properties;
    assert_eq!(record["HostedZoneId"], json!("ZSTAGING"));
    assert_eq!(
        record["AliasTarget"]["DNSName"],
        json!({ "Fn::GetAtt": ["siteCloudFrontDistribution", "DomainName"] })
    );
}

#[tokio::test]
async fn test_us_east_1_stack_keeps_certificate_inline() {
    let config = custom_config();
    let mut synth = TemplateSynthesizer::new("stagingSpaStack", "us-east-1", zones());

    ProvisioningPlanBuilder::new(&config)
        .build_stack(&mut synth)
        .await
        .unwrap();
    let app = synth.finish();

    assert_eq!(app.stacks.len(), 1);
    let template = &app.stacks[0].template;
    assert!(template.parameters.is_empty());
    assert_eq!(
        template.resources["siteCloudFrontDistribution"].properties["DistributionConfig"]
            ["ViewerCertificate"]["AcmCertificateArn"],
        json!({ "Ref": "siteWebsiteCertificate" })
    );
}

#[tokio::test]
async fn test_missing_zone_fails_synthesis() {
    let config = custom_config();
    let mut synth =
        TemplateSynthesizer::new("stagingSpaStack", "eu-west-1", StaticZones::default());

    let err = ProvisioningPlanBuilder::new(&config)
        .build_stack(&mut synth)
        .await
        .unwrap_err();

    assert!(matches!(err, StackError::Lookup { .. }));
    assert!(synth.finish().stacks[0].template.resources.is_empty());
}

#[tokio::test]
async fn test_security_headers_are_rendered() {
    let config = SiteConfig::new("site", "shop", "dev");
    let mut synth = TemplateSynthesizer::new("devSpaStack", "eu-west-1", StaticZones::default());

    ProvisioningPlanBuilder::new(&config)
        .build_stack(&mut synth)
        .await
        .unwrap();
    let app = synth.finish();

    let policy = &app.stacks[0].template.resources["siteResponseHeaderPolicy"].properties
        ["ResponseHeadersPolicyConfig"];
    assert_eq!(policy["Comment"], json!("Security headers response header policy"));
    let headers = &policy["SecurityHeadersConfig"];
    assert_eq!(
        headers["StrictTransportSecurity"]["AccessControlMaxAgeSec"],
        json!(63_072_000)
    );
    assert_eq!(headers["FrameOptions"]["FrameOption"], json!("DENY"));
    assert_eq!(
        headers["ReferrerPolicy"]["ReferrerPolicy"],
        json!("strict-origin-when-cross-origin")
    );
    assert_eq!(headers["ContentTypeOptions"]["Override"], json!(true));
}
